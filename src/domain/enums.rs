use serde::{Deserialize, Serialize};

/// How completed todos without a daily list are classified in project results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnassignedPolicy {
    /// Never scheduled means never on time: counted as delayed
    #[default]
    CountAsDelayed,
    /// Kept out of the on-time/delayed split entirely (reported as unscheduled)
    Exclude,
}

impl UnassignedPolicy {
    /// Parse policy from a config or CLI value like "exclude"
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().replace('-', "_").as_str() {
            "count_as_delayed" | "delayed" => Some(Self::CountAsDelayed),
            "exclude" => Some(Self::Exclude),
            _ => None,
        }
    }
}

/// Which family of use case implementations the application is wired with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCaseMode {
    /// Store-backed use cases
    #[default]
    Default,
    /// Store-less use cases that only transform the entities they are given
    Mock,
}

/// Kind of entity, used in error messages and record mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Project,
    Todo,
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Todo => "Todo",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unassigned_policy_from_tag() {
        assert_eq!(UnassignedPolicy::from_tag("exclude"), Some(UnassignedPolicy::Exclude));
        assert_eq!(
            UnassignedPolicy::from_tag("count-as-delayed"),
            Some(UnassignedPolicy::CountAsDelayed)
        );
        assert_eq!(UnassignedPolicy::from_tag("DELAYED"), Some(UnassignedPolicy::CountAsDelayed));
        assert_eq!(UnassignedPolicy::from_tag("sometimes"), None);
    }

    #[test]
    fn test_policy_serde_names() {
        let json = serde_json::to_string(&UnassignedPolicy::CountAsDelayed).unwrap();
        assert_eq!(json, "\"count_as_delayed\"");
        let mode: UseCaseMode = serde_json::from_str("\"mock\"").unwrap();
        assert_eq!(mode, UseCaseMode::Mock);
    }
}
