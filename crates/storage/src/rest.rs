use std::cell::{Cell, RefCell};

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use grippo_domain as domain;
use grippo_domain::{
    AdminUser, CreateError, Credentials, CurrentUser, DeleteError, Locale, ReadError, Role,
    Session, StorageError, UpdateError,
};

pub const DEFAULT_BASE_URL: &str = "https://grippo-app.com";

/// REST client for the catalog backend. Requests carry a bearer token once
/// a session is established and an `accept-language` header selecting which
/// locale's text the backend returns.
pub struct Rest {
    base_url: String,
    token: RefCell<String>,
    locale: Cell<Locale>,
}

impl Rest {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RefCell::new(String::new()),
            locale: Cell::new(Locale::DEFAULT),
        }
    }

    pub fn set_token(&self, token: &str) {
        *self.token.borrow_mut() = token.to_string();
    }

    pub fn clear_token(&self) {
        self.token.borrow_mut().clear();
    }

    pub fn set_locale(&self, locale: Locale) {
        self.locale.set(locale);
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn headers(&self, builder: RequestBuilder, locale: Locale, auth: bool) -> RequestBuilder {
        let mut builder = builder
            .header("accept", "application/json")
            .header("accept-language", locale.code());

        if auth {
            let token = self.token.borrow();
            if !token.is_empty() {
                builder = builder.header("authorization", &format!("Bearer {token}"));
            }
        }

        builder
    }

    fn get(&self, path: &str, locale: Locale, auth: bool) -> Result<Request, StorageError> {
        build(self.headers(Request::get(&self.url(path)), locale, auth))
    }
}

impl Default for Rest {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl domain::ExerciseExampleRepository for Rest {
    async fn read_exercise_examples(&self) -> Result<Value, ReadError> {
        Ok(fetch(self.get("exercise-examples", Locale::DEFAULT, true)?).await?)
    }

    async fn read_exercise_example(&self, id: &str, locale: Locale) -> Result<Value, ReadError> {
        Ok(fetch(self.get(&format!("exercise-examples/{id}"), locale, true)?).await?)
    }

    async fn create_exercise_example(&self, payload: &Value) -> Result<Value, CreateError> {
        let request = json_body(
            self.headers(
                Request::post(&self.url("admin/exercise-examples")),
                self.locale.get(),
                true,
            ),
            payload,
        )?;

        let response = perform(request).await?;
        if response.status() == 409 {
            return Err(CreateError::Conflict);
        }
        check(&response)?;

        Ok(parse(response).await?)
    }

    async fn update_exercise_example(
        &self,
        id: &str,
        payload: &Value,
    ) -> Result<Value, UpdateError> {
        let request = json_body(
            self.headers(
                Request::put(&self.url(&format!("admin/exercise-examples?id={id}"))),
                self.locale.get(),
                true,
            ),
            payload,
        )?;

        let response = perform(request).await?;
        if response.status() == 409 {
            return Err(UpdateError::Conflict);
        }
        check(&response)?;

        // The backend answers updates with an empty body on some versions.
        Ok(response.json().await.unwrap_or(Value::Null))
    }

    async fn delete_exercise_example(&self, id: &str) -> Result<(), DeleteError> {
        let request = self.headers(
            Request::delete(&self.url(&format!("admin/exercise-examples/{id}"))),
            self.locale.get(),
            true,
        );

        Ok(fetch_no_content(build(request)?).await?)
    }
}

impl domain::DictionaryRepository for Rest {
    async fn read_equipment(&self) -> Result<Value, ReadError> {
        Ok(fetch(self.get("equipments", self.locale.get(), false)?).await?)
    }

    async fn read_muscles(&self) -> Result<Value, ReadError> {
        Ok(fetch(self.get("muscles", self.locale.get(), false)?).await?)
    }
}

impl domain::SessionRepository for Rest {
    async fn login(&self, credentials: &Credentials) -> Result<Session, ReadError> {
        let request = json_body(
            self.headers(
                Request::post(&self.url("auth/login")),
                self.locale.get(),
                false,
            ),
            credentials,
        )?;

        let session: Session = fetch(request).await.map_err(ReadError::from)?;
        self.set_token(&session.token);

        Ok(session)
    }

    async fn read_current_user(&self) -> Result<CurrentUser, ReadError> {
        Ok(fetch(self.get("user", self.locale.get(), true)?).await?)
    }
}

impl domain::UserRepository for Rest {
    async fn read_users(&self) -> Result<Vec<AdminUser>, ReadError> {
        Ok(fetch(self.get("admin/users", self.locale.get(), true)?).await?)
    }

    async fn make_admin(&self, email: &str) -> Result<(), UpdateError> {
        let request = json_body(
            self.headers(
                Request::post(&self.url("admin/users/make-admin")),
                self.locale.get(),
                true,
            ),
            &serde_json::json!({ "email": email }),
        )?;

        Ok(fetch_no_content(request).await?)
    }

    async fn set_user_role(&self, id: &str, role: Role) -> Result<(), UpdateError> {
        let request = json_body(
            self.headers(
                Request::put(&self.url(&format!("admin/users/{id}/role"))),
                self.locale.get(),
                true,
            ),
            &serde_json::json!({ "role": role }),
        )?;

        Ok(fetch_no_content(request).await?)
    }

    async fn delete_user(&self, id: &str) -> Result<(), DeleteError> {
        let request = self.headers(
            Request::delete(&self.url(&format!("admin/users/{id}"))),
            self.locale.get(),
            true,
        );

        Ok(fetch_no_content(build(request)?).await?)
    }
}

fn build(builder: RequestBuilder) -> Result<Request, StorageError> {
    builder
        .build()
        .map_err(|err| StorageError::Other(err.to_string().into()))
}

fn json_body<T: serde::Serialize>(
    builder: RequestBuilder,
    body: &T,
) -> Result<Request, StorageError> {
    builder
        .json(body)
        .map_err(|err| StorageError::Other(format!("serialization failed: {err:?}").into()))
}

async fn perform(request: Request) -> Result<Response, StorageError> {
    request.send().await.map_err(|_| StorageError::NoConnection)
}

fn check(response: &Response) -> Result<(), StorageError> {
    match response.status() {
        401 | 403 => Err(StorageError::NoSession),
        _ if response.ok() => Ok(()),
        status => Err(StorageError::Other(
            format!("{status} {}", response.status_text()).into(),
        )),
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, StorageError> {
    response
        .json()
        .await
        .map_err(|err| StorageError::Other(format!("deserialization failed: {err:?}").into()))
}

async fn fetch<T: DeserializeOwned>(request: Request) -> Result<T, StorageError> {
    let response = perform(request).await?;
    check(&response)?;
    parse(response).await
}

async fn fetch_no_content(request: Request) -> Result<(), StorageError> {
    let response = perform(request).await?;
    check(&response)
}
