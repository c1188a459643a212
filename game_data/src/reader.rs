use crate::{Error, Property};

const SPACES_PER_INDENT: usize = 4;

/// Parser for preset text.
#[derive(Copy, Clone, Debug, Default)]
pub struct Reader;

impl Reader {
    /// Parses `text` into its top-level properties.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if a line is not a `Name = Value` pair or if a line is indented
    /// more than one level below the previous property.
    pub fn parse(text: &str) -> Result<Vec<Property>, Error> {
        let mut roots = Vec::new();
        // Chain of currently open properties, one per indentation level.
        let mut stack: Vec<Property> = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;

            let content = match raw.find("//") {
                Some(pos) => &raw[..pos],
                None => raw,
            };
            let content = content.trim_end();
            if content.trim_start().is_empty() {
                continue;
            }

            let indent = indentation(content);
            if indent > stack.len() {
                return Err(Error::UnexpectedIndent { line });
            }

            let Some((name, value)) = content.trim_start().split_once('=') else {
                return Err(Error::MissingSeparator { line });
            };

            let name = name.trim();
            if name.is_empty() {
                return Err(Error::EmptyName { line });
            }

            while stack.len() > indent {
                close(&mut stack, &mut roots);
            }

            stack.push(Property {
                name: name.to_owned(),
                value: value.trim().to_owned(),
                line,
                children: Vec::new(),
            });
        }

        while !stack.is_empty() {
            close(&mut stack, &mut roots);
        }

        Ok(roots)
    }
}

fn close(stack: &mut Vec<Property>, roots: &mut Vec<Property>) {
    let Some(prop) = stack.pop() else {
        return;
    };

    match stack.last_mut() {
        Some(parent) => parent.children.push(prop),
        None => roots.push(prop),
    }
}

fn indentation(line: &str) -> usize {
    let mut level = 0;
    let mut spaces = 0;

    for c in line.chars() {
        match c {
            '\t' => {
                level += 1;
                spaces = 0;
            }
            ' ' => {
                spaces += 1;
                if spaces == SPACES_PER_INDENT {
                    level += 1;
                    spaces = 0;
                }
            }
            _ => break,
        }
    }

    level
}

#[cfg(test)]
mod tests {
    use super::Reader;
    use crate::Error;

    #[test]
    fn parse_nested_blocks() {
        let text = "\
AddEffect = MOPixel
\tPresetName = Spark // trailing comment
\tMass = 0.01

// A second object.
AddDevice = Attachable
    PresetName = Arm
    ParentOffset = Vector
        X = 4
        Y = -2
    Mass = 3
";
        let props = Reader::parse(text).unwrap();
        assert_eq!(props.len(), 2);

        assert_eq!(props[0].name, "AddEffect");
        assert_eq!(props[0].value, "MOPixel");
        assert_eq!(props[0].children.len(), 2);
        assert_eq!(props[0].children[0].value, "Spark");

        let arm = &props[1];
        assert_eq!(arm.children.len(), 3);
        assert_eq!(arm.children[1].children.len(), 2);
        assert_eq!(arm.children[2].name, "Mass");
        assert_eq!(arm.children[2].line, 11);
    }

    #[test]
    fn missing_separator() {
        let err = Reader::parse("AddEffect = MOPixel\n\tPresetName\n").unwrap_err();
        assert_eq!(err, Error::MissingSeparator { line: 2 });
    }

    #[test]
    fn skipped_indentation_level() {
        let err = Reader::parse("AddEffect = MOPixel\n\t\tMass = 1\n").unwrap_err();
        assert_eq!(err, Error::UnexpectedIndent { line: 2 });
    }

    #[test]
    fn empty_name() {
        let err = Reader::parse(" = 4\n").unwrap_err();
        assert_eq!(err, Error::EmptyName { line: 1 });
    }
}
