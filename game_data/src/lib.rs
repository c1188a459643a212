//! Types and (de)serializers for preset files.
//!
//! Presets are stored in a textual keyed-property format:
//!
//! ```text
//! // Comments run to the end of the line.
//! AddDevice = Attachable
//!     PresetName = Arm
//!     Mass = 3.5
//!     ParentOffset = Vector
//!         X = 4
//!         Y = -2
//! ```
//!
//! Every line holds one `Name = Value` pair. Lines indented one level deeper than a
//! property are its children and describe the object named by its value.

mod error;
mod property;
mod reader;
mod writer;

pub use error::Error;
pub use property::Property;
pub use reader::Reader;
pub use writer::Writer;

/// A type that can be read from and written to the preset format.
pub trait Serializable {
    /// The class name introducing an object of this type, e.g. `Attachable`.
    const CLASS: &'static str;

    /// Applies a single property to `self`.
    ///
    /// Returns `Ok(false)` if the property name is not known to this type.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the property is known, but its value is invalid.
    fn read_property(&mut self, prop: &Property) -> Result<bool, Error>;

    /// Writes all properties of `self`.
    fn save(&self, writer: &mut Writer);
}

/// Applies all `props` to `object`.
///
/// Unknown properties are logged and skipped.
///
/// # Errors
///
/// Returns an [`Error`] if any known property has an invalid value.
pub fn apply<T>(object: &mut T, props: &[Property]) -> Result<(), Error>
where
    T: Serializable,
{
    for prop in props {
        if !object.read_property(prop)? {
            tracing::warn!(
                "line {}: unknown property `{}` for {}, skipping",
                prop.line,
                prop.name,
                T::CLASS
            );
        }
    }

    Ok(())
}

/// Reads an object from the children of `prop`.
///
/// # Errors
///
/// Returns an [`Error`] if the children of `prop` are not a valid `T`.
pub fn read_object<T>(prop: &Property) -> Result<T, Error>
where
    T: Serializable + Default,
{
    let mut object = T::default();
    apply(&mut object, &prop.children)?;
    Ok(object)
}

/// Writes `object` as a property `name` introducing a nested block.
pub fn write_object<T>(writer: &mut Writer, name: &str, object: &T)
where
    T: Serializable,
{
    writer.begin(name, T::CLASS);
    object.save(writer);
    writer.end();
}

/// Parses `text` and reads the first top-level object as a `T`.
///
/// # Errors
///
/// Returns an [`Error`] if `text` is malformed or contains no object.
pub fn from_str<T>(text: &str) -> Result<T, Error>
where
    T: Serializable + Default,
{
    let props = Reader::parse(text)?;
    let root = props.first().ok_or(Error::Empty)?;
    read_object(root)
}

/// Writes `object` as a top-level property `name`.
pub fn to_string<T>(name: &str, object: &T) -> String
where
    T: Serializable,
{
    let mut writer = Writer::new();
    write_object(&mut writer, name, object);
    writer.finish()
}
