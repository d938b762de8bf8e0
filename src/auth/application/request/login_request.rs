use crate::core::domain::model::credentials::Credentials;

/// Form body of `POST /access/ticket`.
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub realm: &'a str,
}

impl<'a> LoginRequest<'a> {
    pub fn from_credentials(credentials: &'a Credentials) -> Self {
        Self {
            username: credentials.username(),
            password: credentials.password(),
            realm: credentials.realm(),
        }
    }

    pub fn into_form(self) -> Vec<(String, String)> {
        vec![
            ("username".to_string(), self.username.to_string()),
            ("password".to_string(), self.password.to_string()),
            ("realm".to_string(), self.realm.to_string()),
        ]
    }
}
