use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use serde_json::Value;

use crate::{
    build_persistence_payload, merge_locale_payloads, normalize, AdminUser, Context, CreateError,
    Credentials, CurrentUser, DeleteError, Dictionaries, Entity, ListItem, Locale, ReadError,
    Role, Session, UpdateError,
};

#[allow(async_fn_in_trait)]
pub trait ExerciseExampleRepository {
    async fn read_exercise_examples(&self) -> Result<Value, ReadError>;
    async fn read_exercise_example(&self, id: &str, locale: Locale) -> Result<Value, ReadError>;
    async fn create_exercise_example(&self, payload: &Value) -> Result<Value, CreateError>;
    async fn update_exercise_example(&self, id: &str, payload: &Value)
        -> Result<Value, UpdateError>;
    async fn delete_exercise_example(&self, id: &str) -> Result<(), DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait DictionaryRepository {
    async fn read_equipment(&self) -> Result<Value, ReadError>;
    async fn read_muscles(&self) -> Result<Value, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait SessionRepository {
    async fn login(&self, credentials: &Credentials) -> Result<Session, ReadError>;
    async fn read_current_user(&self) -> Result<CurrentUser, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait UserRepository {
    async fn read_users(&self) -> Result<Vec<AdminUser>, ReadError>;
    async fn make_admin(&self, email: &str) -> Result<(), UpdateError>;
    async fn set_user_role(&self, id: &str, role: Role) -> Result<(), UpdateError>;
    async fn delete_user(&self, id: &str) -> Result<(), DeleteError>;
}

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: ExerciseExampleRepository> Service<R> {
    pub async fn read_exercise_examples(&self) -> Result<Vec<ListItem>, ReadError> {
        log_on_error!(
            self.fetch_list(),
            ReadError,
            "read",
            "exercise examples"
        )
    }

    /// Loads the full localized record: one detail fetch per supported
    /// locale, merged in locale-iteration order. A locale whose fetch fails
    /// is skipped; only when every locale fails does the load itself fail.
    pub async fn read_localized_exercise_example(&self, id: &str) -> Result<Entity, ReadError> {
        log_on_error!(
            self.fetch_localized(id),
            ReadError,
            "read",
            "exercise example"
        )
    }

    /// Returns the server-assigned ID when the response carries one.
    pub async fn create_exercise_example(
        &self,
        entity: &Entity,
    ) -> Result<Option<String>, CreateError> {
        log_on_error!(
            self.post_entity(entity),
            CreateError,
            "create",
            "exercise example"
        )
    }

    pub async fn update_exercise_example(
        &self,
        id: &str,
        entity: &Entity,
    ) -> Result<(), UpdateError> {
        log_on_error!(
            self.put_entity(id, entity),
            UpdateError,
            "update",
            "exercise example"
        )
    }

    pub async fn delete_exercise_example(&self, id: &str) -> Result<(), DeleteError> {
        log_on_error!(
            self.repository.delete_exercise_example(id),
            DeleteError,
            "delete",
            "exercise example"
        )
    }

    async fn fetch_list(&self) -> Result<Vec<ListItem>, ReadError> {
        let response = self.repository.read_exercise_examples().await?;
        parse_list(&response)
    }

    async fn fetch_localized(&self, id: &str) -> Result<Entity, ReadError> {
        let mut payloads = Vec::new();
        let mut first_error = None;

        for locale in Locale::iter() {
            match self.repository.read_exercise_example(id, *locale).await {
                Ok(payload) => payloads.push((*locale, payload)),
                Err(err) => {
                    warn!("failed to read {} text of exercise example: {err}", locale);
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        match merge_locale_payloads(&payloads) {
            Some(entity) => Ok(entity),
            None => Err(first_error
                .unwrap_or_else(|| ReadError::Other("no locale payloads received".into()))),
        }
    }

    async fn post_entity(&self, entity: &Entity) -> Result<Option<String>, CreateError> {
        let payload = build_persistence_payload(entity);
        let response = self.repository.create_exercise_example(&payload).await?;

        Ok(response
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn put_entity(&self, id: &str, entity: &Entity) -> Result<(), UpdateError> {
        let payload = build_persistence_payload(entity);
        self.repository.update_exercise_example(id, &payload).await?;
        Ok(())
    }
}

impl<R: DictionaryRepository> Service<R> {
    /// Fetches both reference dictionaries. A failed endpoint leaves its
    /// dictionary empty rather than failing the whole startup; the validator
    /// then reports the affected references as unknown.
    pub async fn load_dictionaries(&self) -> Dictionaries {
        let mut dictionaries = Dictionaries::default();

        match self.repository.read_equipment().await {
            Ok(response) => dictionaries.insert_equipment(&response),
            Err(err) => warn!("failed to read equipment dictionary: {err}"),
        }
        match self.repository.read_muscles().await {
            Ok(response) => dictionaries.insert_muscles(&response),
            Err(err) => warn!("failed to read muscle dictionary: {err}"),
        }

        dictionaries
    }
}

impl<R: SessionRepository> Service<R> {
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ReadError> {
        log_on_error!(self.repository.login(credentials), ReadError, "request", "session")
    }

    pub async fn current_user(&self) -> Result<CurrentUser, ReadError> {
        log_on_error!(
            self.repository.read_current_user(),
            ReadError,
            "read",
            "current user"
        )
    }
}

impl<R: UserRepository> Service<R> {
    pub async fn users(&self) -> Result<Vec<AdminUser>, ReadError> {
        log_on_error!(self.repository.read_users(), ReadError, "read", "users")
    }

    pub async fn make_admin(&self, email: &str) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository.make_admin(email),
            UpdateError,
            "promote",
            "user"
        )
    }

    pub async fn set_user_role(&self, id: &str, role: Role) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository.set_user_role(id, role),
            UpdateError,
            "update",
            "user role"
        )
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), DeleteError> {
        log_on_error!(self.repository.delete_user(id), DeleteError, "delete", "user")
    }
}

/// One list row is either `{entity, usageCount?, lastUsed?}` or the bare
/// entity JSON; both occur in the wild.
fn parse_list(response: &Value) -> Result<Vec<ListItem>, ReadError> {
    let Value::Array(rows) = response else {
        return Err(ReadError::Other(
            "Unexpected response shape: expected an array".into(),
        ));
    };

    Ok(rows.iter().map(parse_list_item).collect())
}

fn parse_list_item(row: &Value) -> ListItem {
    let entity_raw = row.get("entity").unwrap_or(row);

    ListItem {
        entity: normalize(entity_raw, &Context::default()),
        usage_count: row.get("usageCount").and_then(Value::as_u64).unwrap_or(0),
        last_used: row
            .get("lastUsed")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|moment| moment.with_timezone(&Utc)),
    }
}
