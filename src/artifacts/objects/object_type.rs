use crate::errors::ObjectError;
use std::io::BufRead;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    /// Parse the `<type> <size>\0` header, leaving the reader at the body.
    ///
    /// The declared size is returned as parsed and is not checked against the
    /// actual body length; consumers that depend on it must tolerate a
    /// mismatch.
    pub fn parse_header(data_reader: &mut impl BufRead) -> anyhow::Result<(ObjectType, usize)> {
        let mut object_type = Vec::new();
        data_reader.read_until(b' ', &mut object_type)?;
        if object_type.last() != Some(&b' ') {
            return Err(ObjectError::Malformed("missing type/size separator".to_string()).into());
        }
        object_type.pop();

        let object_type = std::str::from_utf8(&object_type)
            .map_err(|_| ObjectError::Malformed("non-utf8 type token".to_string()))?;
        let object_type = ObjectType::try_from(object_type)?;

        let mut size = Vec::new();
        data_reader.read_until(b'\0', &mut size)?;
        if size.last() != Some(&b'\0') {
            return Err(ObjectError::Malformed("missing NUL after size field".to_string()).into());
        }
        size.pop();

        let size = std::str::from_utf8(&size)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| ObjectError::Malformed("invalid size field".to_string()))?;

        Ok((object_type, size))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = ObjectError;

    fn try_from(value: &str) -> Result<Self, ObjectError> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            _ => Err(ObjectError::UnknownType(value.to_string())),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
