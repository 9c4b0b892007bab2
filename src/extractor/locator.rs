use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One `tag[index]` step of a locator path. The index is 1-based and counts
/// preceding siblings with the same tag, matching XPath positional syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Step {
    pub tag: String,
    pub index: usize,
}

/// Stable structural path identifying a text block's position in the source
/// document. Reproducible across re-extraction of the same markup; rendered
/// as an XPath-like string (`/html[1]/body[1]/div[1]/p[2]`). The empty path
/// (`/`) addresses the document as a whole and is used by document-scope
/// issues.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Locator {
    steps: Vec<Step>,
}

impl Locator {
    /// The whole-document locator, ordered before every block locator.
    pub fn document() -> Self {
        Self::default()
    }

    pub fn is_document(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub(crate) fn child(&self, tag: &str, index: usize) -> Self {
        let mut steps = self.steps.clone();
        steps.push(Step {
            tag: tag.to_string(),
            index,
        });
        Self { steps }
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "/");
        }
        for step in &self.steps {
            write!(f, "/{}[{}]", step.tag, step.index)?;
        }
        Ok(())
    }
}

/// Error parsing a locator from its textual form.
#[derive(Debug, thiserror::Error)]
#[error("malformed locator step: '{0}'")]
pub struct LocatorParseError(String);

impl FromStr for Locator {
    type Err = LocatorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return Ok(Self::document());
        }
        let mut steps = Vec::new();
        for part in trimmed.split('/').filter(|p| !p.is_empty()) {
            let open = part
                .find('[')
                .ok_or_else(|| LocatorParseError(part.to_string()))?;
            if !part.ends_with(']') {
                return Err(LocatorParseError(part.to_string()));
            }
            let tag = &part[..open];
            let index: usize = part[open + 1..part.len() - 1]
                .parse()
                .map_err(|_| LocatorParseError(part.to_string()))?;
            if tag.is_empty() || index == 0 {
                return Err(LocatorParseError(part.to_string()));
            }
            steps.push(Step {
                tag: tag.to_string(),
                index,
            });
        }
        Ok(Self { steps })
    }
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Locator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
