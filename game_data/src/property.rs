use std::str::FromStr;

use glam::Vec2;

use crate::Error;

/// A single `Name = Value` line and the lines nested below it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
    /// The 1-based line this property was read from, `0` if it was built in code.
    pub line: usize,
    pub children: Vec<Property>,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            line: 0,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Property) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the first child with the given `name`.
    pub fn child(&self, name: &str) -> Option<&Property> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Parses the value as a `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the value is not a valid `T`.
    pub fn parse<T>(&self) -> Result<T, Error>
    where
        T: FromStr,
    {
        self.value.parse().map_err(|_| self.invalid())
    }

    /// Parses the value as a boolean. Accepts `0`, `1`, `false` and `true`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for any other value.
    pub fn as_bool(&self) -> Result<bool, Error> {
        match self.value.as_str() {
            "1" | "true" | "True" => Ok(true),
            "0" | "false" | "False" => Ok(false),
            _ => Err(self.invalid()),
        }
    }

    /// Reads a `Vector` block with `X` and `Y` children. Missing components are `0`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if a component is not a number.
    pub fn as_vec2(&self) -> Result<Vec2, Error> {
        let mut v = Vec2::ZERO;

        for child in &self.children {
            match child.name.as_str() {
                "X" => v.x = child.parse()?,
                "Y" => v.y = child.parse()?,
                _ => (),
            }
        }

        Ok(v)
    }

    /// Returns the preset name referenced by this property.
    ///
    /// References are written as a class block with a `CopyOf` (or `PresetName`) child.
    pub fn preset_reference(&self) -> Option<&str> {
        self.child("CopyOf")
            .or_else(|| self.child("PresetName"))
            .map(|child| child.value.as_str())
    }

    /// Returns an [`Error::InvalidValue`] for this property.
    pub fn invalid(&self) -> Error {
        Error::InvalidValue {
            line: self.line,
            name: self.name.clone(),
            value: self.value.clone(),
        }
    }

    /// Returns an [`Error::UnknownClass`] for this property.
    pub fn unknown_class(&self) -> Error {
        Error::UnknownClass {
            line: self.line,
            name: self.name.clone(),
            class: self.value.clone(),
        }
    }
}
