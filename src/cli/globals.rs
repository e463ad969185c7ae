use secrecy::SecretString;

/// Platform credentials read once at start-up.
#[derive(Clone)]
pub struct GlobalArgs {
    pub content_token: SecretString,
    pub hosting_token: SecretString,
    pub hosting_team_id: Option<String>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(content_token: SecretString, hosting_token: SecretString) -> Self {
        Self {
            content_token,
            hosting_token,
            hosting_team_id: None,
        }
    }

    pub fn set_team_id(&mut self, team_id: Option<String>) {
        self.hosting_team_id = team_id;
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("content_token", &"***")
            .field("hosting_token", &"***")
            .field("hosting_team_id", &self.hosting_team_id)
            .finish()
    }
}
