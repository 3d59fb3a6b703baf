//! User lookup command.

use newsdesk_api::db::{IdentityStore, PgUserRepository};
use newsdesk_core::Email;

/// Key to look a user up by.
pub enum Lookup {
    Email(String),
    ExternalId(String),
}

/// Print the matching user as JSON.
///
/// # Errors
///
/// Returns an error if the email is malformed, the query fails, or no
/// user matches.
pub async fn show(lookup: Lookup) -> Result<(), Box<dyn std::error::Error>> {
    let user = match lookup {
        Lookup::Email(raw) => {
            // Validate before connecting.
            let email = Email::parse(&raw)?;
            let users = PgUserRepository::new(super::connect().await?);
            users.get_user_by_email(&email).await?
        }
        Lookup::ExternalId(id) => {
            let users = PgUserRepository::new(super::connect().await?);
            users.get_user_by_external_id(&id).await?
        }
    };

    let Some(user) = user else {
        return Err("no matching user".into());
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&user)?);
    }
    Ok(())
}
