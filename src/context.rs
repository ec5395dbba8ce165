use crate::session::Session;

// Read-only state a component needs to render around the form itself.
#[derive(Debug)]
pub struct Context<'a> {
    pub session: &'a Session,
    pub status: Option<&'a str>,
    pub token_name: Option<String>, // Display name of the tracked token, if the host knows it.
}
