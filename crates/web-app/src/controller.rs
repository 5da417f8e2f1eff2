use grippo_domain::{
    normalize, validate, Context, Dictionaries, Entity, Locale, Validation,
};
use serde_json::Value;

/// Whether the edited entity already exists on the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    New,
    Persisted(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum EditorState {
    Idle,
    Loading {
        id: String,
        token: u64,
        snapshot: Box<EditorState>,
    },
    Editing {
        origin: Origin,
        entity: Entity,
        validation: Validation,
    },
    Saving {
        origin: Origin,
        entity: Entity,
    },
}

/// Drives the editor over one piece of state: which entity is being edited
/// and whether it is new, loading, or being saved.
///
/// Loads are asynchronous and the list stays interactive while one is in
/// flight, so every load carries a token; a response whose token no longer
/// matches the current state belongs to a superseded selection and is
/// discarded. The caller performs the actual I/O between `begin_*` and
/// `commit_*`/`fail_*`.
pub struct Controller {
    dictionaries: Dictionaries,
    locale: Locale,
    state: EditorState,
    next_token: u64,
    last_error: Option<String>,
}

impl Controller {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dictionaries: Dictionaries::default(),
            locale: Locale::DEFAULT,
            state: EditorState::Idle,
            next_token: 0,
            last_error: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_dictionaries(&mut self, dictionaries: Dictionaries) {
        self.dictionaries = dictionaries;
        self.revalidate();
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
        self.renormalize();
    }

    pub fn new_item(&mut self) {
        let entity = Entity::template();
        let validation = validate(&entity, &self.dictionaries);

        self.last_error = None;
        self.state = EditorState::Editing {
            origin: Origin::New,
            entity,
            validation,
        };
    }

    pub fn deselect(&mut self) {
        self.state = EditorState::Idle;
    }

    /// Starts loading the given item and returns the token the eventual
    /// response must present. The pre-load state is kept for rollback; a
    /// re-selection during an in-flight load keeps the original snapshot.
    pub fn begin_load(&mut self, id: &str) -> u64 {
        self.next_token += 1;
        self.last_error = None;

        let snapshot = match std::mem::replace(&mut self.state, EditorState::Idle) {
            EditorState::Loading { snapshot, .. } => snapshot,
            other => Box::new(other),
        };

        self.state = EditorState::Loading {
            id: id.to_string(),
            token: self.next_token,
            snapshot,
        };

        self.next_token
    }

    /// Commits a finished load. Returns false when the response is stale
    /// and was discarded.
    pub fn commit_load(&mut self, token: u64, entity: Entity) -> bool {
        match &self.state {
            EditorState::Loading { token: current, .. } if *current == token => {
                let validation = validate(&entity, &self.dictionaries);
                self.state = EditorState::Editing {
                    origin: Origin::Persisted(entity.id.clone()),
                    entity,
                    validation,
                };
                true
            }
            _ => false,
        }
    }

    /// Rolls back to the pre-load state. Stale failures are ignored.
    pub fn fail_load(&mut self, token: u64, message: &str) {
        if let EditorState::Loading { token: current, .. } = &self.state {
            if *current == token {
                self.last_error = Some(message.to_string());
                if let EditorState::Loading { snapshot, .. } =
                    std::mem::replace(&mut self.state, EditorState::Idle)
                {
                    self.state = *snapshot;
                }
            }
        }
    }

    /// Applies a form mutation to the live entity, then re-normalizes and
    /// re-validates it.
    pub fn mutate(&mut self, mutation: impl FnOnce(&mut Entity)) {
        if let EditorState::Editing { entity, .. } = &mut self.state {
            mutation(entity);
        }
        self.renormalize();
    }

    /// Feeds a raw JSON editor buffer into the live entity. Returns false
    /// (leaving the entity untouched) when the buffer does not parse.
    pub fn apply_json(&mut self, raw: &str) -> bool {
        let Ok(parsed) = serde_json::from_str::<Value>(raw) else {
            return false;
        };

        if let EditorState::Editing {
            entity, validation, ..
        } = &mut self.state
        {
            let normalized = normalize(
                &parsed,
                &Context {
                    locale: self.locale,
                    previous: Some(entity),
                },
            );
            *validation = validate(&normalized, &self.dictionaries);
            *entity = normalized;
            true
        } else {
            false
        }
    }

    /// The JSON view of the live entity.
    #[must_use]
    pub fn editor_json(&self) -> Option<String> {
        match &self.state {
            EditorState::Editing { entity, .. } => {
                serde_json::to_string_pretty(entity).ok()
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn save_enabled(&self) -> bool {
        matches!(
            &self.state,
            EditorState::Editing { validation, .. } if validation.ok
        )
    }

    /// Moves into the saving state and hands out what the request needs:
    /// the ID to update (None for a create) and the entity to serialize.
    /// Returns None when saving is not currently allowed, including while a
    /// save is already in flight.
    pub fn begin_save(&mut self) -> Option<(Option<String>, Entity)> {
        if !self.save_enabled() {
            return None;
        }

        if let EditorState::Editing { origin, entity, .. } =
            std::mem::replace(&mut self.state, EditorState::Idle)
        {
            let id = match &origin {
                Origin::New => None,
                Origin::Persisted(id) => Some(id.clone()),
            };
            let snapshot = entity.clone();

            self.last_error = None;
            self.state = EditorState::Saving { origin, entity };

            Some((id, snapshot))
        } else {
            None
        }
    }

    /// A successful save makes the entity persisted under the ID the server
    /// assigned (or confirms the existing one).
    pub fn commit_save(&mut self, server_id: Option<String>) {
        if let EditorState::Saving { origin, mut entity } =
            std::mem::replace(&mut self.state, EditorState::Idle)
        {
            let id = server_id.unwrap_or_else(|| match origin {
                Origin::Persisted(id) => id,
                Origin::New => entity.id.clone(),
            });
            entity.id = id.clone();

            let validation = validate(&entity, &self.dictionaries);
            self.state = EditorState::Editing {
                origin: Origin::Persisted(id),
                entity,
                validation,
            };
        }
    }

    /// A failed save keeps the entity editable and surfaces the error.
    pub fn fail_save(&mut self, message: &str) {
        if let EditorState::Saving { origin, entity } =
            std::mem::replace(&mut self.state, EditorState::Idle)
        {
            let validation = validate(&entity, &self.dictionaries);

            self.last_error = Some(message.to_string());
            self.state = EditorState::Editing {
                origin,
                entity,
                validation,
            };
        }
    }

    fn renormalize(&mut self) {
        if let EditorState::Editing {
            entity, validation, ..
        } = &mut self.state
        {
            // The translation maps are authoritative; the derived scalars
            // must not resurrect a slot the mutation just cleared.
            entity.name = entity.name_translations.get(Locale::DEFAULT).to_string();
            entity.description = entity
                .description_translations
                .get(Locale::DEFAULT)
                .to_string();

            let raw = serde_json::to_value(&*entity).unwrap_or(Value::Null);
            let normalized = normalize(
                &raw,
                &Context {
                    locale: self.locale,
                    previous: Some(entity),
                },
            );
            *validation = validate(&normalized, &self.dictionaries);
            *entity = normalized;
        }
    }

    fn revalidate(&mut self) {
        if let EditorState::Editing {
            entity, validation, ..
        } = &mut self.state
        {
            *validation = validate(entity, &self.dictionaries);
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}
