// src/association/rules.rs
pub const UNKNOWN_ROLE: &str = "Unknown";

/// Posting titles containing `pattern` (case-insensitive) belong to `role`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleRule {
    pub pattern: String,
    pub role: String,
}

/// Ordered title → role rules. The first matching rule wins; titles no rule
/// matches go to [`UNKNOWN_ROLE`].
#[derive(Debug, Clone, PartialEq)]
pub struct RoleRules {
    rules: Vec<RoleRule>,
}

impl Default for RoleRules {
    fn default() -> Self {
        Self::new([
            ("Data Engineer", "Data Engineer"),
            ("Data Scientist", "Data Scientist"),
            ("Backend", "Backend Engineer"),
            ("Frontend", "Frontend Engineer"),
            ("DevOps", "DevOps Engineer"),
        ])
    }
}

impl RoleRules {
    pub fn new<'a>(rules: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|(pattern, role)| RoleRule {
                    pattern: pattern.to_lowercase(),
                    role: role.to_string(),
                })
                .collect(),
        }
    }

    pub fn classify(&self, title: &str) -> &str {
        let title = title.to_lowercase();
        self.rules
            .iter()
            .find(|rule| title.contains(&rule.pattern))
            .map(|rule| rule.role.as_str())
            .unwrap_or(UNKNOWN_ROLE)
    }

    /// Distinct roles in rule order.
    pub fn roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !roles.contains(&rule.role.as_str()) {
                roles.push(&rule.role);
            }
        }
        roles
    }
}
