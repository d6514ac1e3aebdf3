use crate::foundation::error::{StagecastError, StagecastResult};

/// Absolute prim path such as `/World/cam`. The pseudo-root is `/`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScenePath(String);

impl ScenePath {
    /// The pseudo-root path `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Parse and validate an absolute prim path.
    pub fn parse(s: &str) -> StagecastResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(StagecastError::config("prim path must be non-empty"));
        }
        if !s.starts_with('/') {
            return Err(StagecastError::config(format!(
                "prim path '{s}' must be absolute (start with '/')"
            )));
        }
        if s == "/" {
            return Ok(Self::root());
        }
        if s.ends_with('/') {
            return Err(StagecastError::config(format!(
                "prim path '{s}' must not end with '/'"
            )));
        }
        for element in s[1..].split('/') {
            validate_prim_name(element)
                .map_err(|e| StagecastError::config(format!("prim path '{s}': {e}")))?;
        }
        Ok(Self(s.to_string()))
    }

    /// Whether this is the pseudo-root.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Path text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last element (empty for the pseudo-root).
    pub fn name(&self) -> &str {
        if self.is_root() {
            return "";
        }
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// Parent path (`None` for the pseudo-root).
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(i) => Some(Self(self.0[..i].to_string())),
            None => None,
        }
    }

    /// Append a child element.
    pub fn child(&self, name: &str) -> StagecastResult<Self> {
        validate_prim_name(name)?;
        if self.is_root() {
            Ok(Self(format!("/{name}")))
        } else {
            Ok(Self(format!("{}/{name}", self.0)))
        }
    }

    /// Path elements from the root down.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|e| !e.is_empty())
    }

    /// Whether `self` equals `prefix` or lies beneath it.
    pub fn has_prefix(&self, prefix: &ScenePath) -> bool {
        if prefix.is_root() || self == prefix {
            return true;
        }
        self.0
            .strip_prefix(prefix.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl std::fmt::Display for ScenePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ScenePath {
    type Err = StagecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for ScenePath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for ScenePath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Prim names are identifiers: `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn validate_prim_name(name: &str) -> StagecastResult<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(StagecastError::config("prim name must be non-empty"));
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(StagecastError::config(format!(
            "prim name '{name}' must start with a letter or '_'"
        )));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StagecastError::config(format!(
            "prim name '{name}' may only contain letters, digits and '_'"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/path.rs"]
mod tests;
