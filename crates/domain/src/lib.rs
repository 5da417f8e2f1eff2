#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod dictionary;
pub mod entity;
pub mod error;
pub mod list;
pub mod locale;
pub mod merge;
pub mod normalize;
pub mod payload;
pub mod rules;
pub mod service;
pub mod session;
pub mod user;
pub mod validator;

pub use dictionary::{BundleStats, Dictionaries};
pub use entity::{
    Category, Entity, EquipmentRef, Experience, ForceType, ListItem, MuscleBundle, Property,
    WeightType,
};
pub use error::{CreateError, DeleteError, ReadError, StorageError, UpdateError};
pub use list::{ListFilter, SortOrder};
pub use locale::{Locale, LocaleError, TranslationMap};
pub use merge::{merge, merge_locale_payloads};
pub use normalize::{Context, normalize};
pub use payload::{build_persistence_payload, localized_entries};
pub use rules::{BodyWeightComponent, Components, RequiredFlag, Rules};
pub use service::{
    DictionaryRepository, ExerciseExampleRepository, Service, SessionRepository, UserRepository,
};
pub use session::{Credentials, CurrentUser, Session};
pub use user::{AdminUser, Role};
pub use validator::{Validation, validate};
