//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use qcommon::{ChatId, DocumentId, GenerationOptions, MetadataMap, UserId};
//!
//! let user = UserId::from("user-1");
//! let chat = ChatId::new("chat-1");
//! let document = DocumentId::generate();
//! let mut metadata = MetadataMap::new();
//! metadata.insert("tenant".to_string(), "acme".to_string());
//!
//! let options = GenerationOptions::default().with_temperature(0.3).enable_streaming();
//! assert_eq!(user.as_str(), "user-1");
//! assert_eq!(chat.to_string(), "chat-1");
//! assert_eq!(document.as_str().len(), 36);
//! assert!(options.stream);
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use qcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Shared metadata and cross-crate identifier newtypes.
    //!
    //! ```rust
    //! use qcommon::{ChatId, MetadataMap, UserId};
    //!
    //! let chat = ChatId::new("chat-42");
    //! let user = UserId::from("user-42");
    //! let mut metadata = MetadataMap::new();
    //! metadata.insert("env".to_string(), "test".to_string());
    //!
    //! assert_eq!(chat.to_string(), "chat-42");
    //! assert_eq!(user.as_str(), "user-42");
    //! ```

    use std::collections::HashMap;

    pub type MetadataMap = HashMap<String, String>;

    macro_rules! string_id {
        ($(#[$meta:meta])* $name:ident) => {
            $(#[$meta])*
            #[derive(
                Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
                serde::Serialize, serde::Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(String);

            impl $name {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                /// Creates a fresh random (v4) identifier.
                pub fn generate() -> Self {
                    Self(uuid::Uuid::new_v4().to_string())
                }

                pub fn as_str(&self) -> &str {
                    self.0.as_str()
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        };
    }

    string_id!(
        /// Authenticated caller identity.
        UserId
    );
    string_id!(
        /// Conversation identity; one active turn per chat at a time.
        ChatId
    );
    string_id!(DocumentId);
    string_id!(MessageId);
    string_id!(SuggestionId);
}

pub mod kind {
    //! Closed set of generated document kinds.
    //!
    //! ```rust
    //! use qcommon::DocumentKind;
    //!
    //! let kind: DocumentKind = "sheet".parse().expect("known kind");
    //! assert_eq!(kind, DocumentKind::Sheet);
    //! assert_eq!(kind.delta_event_type(), "sheet-delta");
    //! ```

    use std::fmt::{Display, Formatter};
    use std::str::FromStr;

    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum DocumentKind {
        Text,
        Code,
        Sheet,
        Image,
    }

    impl DocumentKind {
        pub const ALL: [DocumentKind; 4] = [Self::Text, Self::Code, Self::Sheet, Self::Image];

        pub fn as_str(&self) -> &'static str {
            match self {
                Self::Text => "text",
                Self::Code => "code",
                Self::Sheet => "sheet",
                Self::Image => "image",
            }
        }

        pub fn delta_event_type(&self) -> &'static str {
            match self {
                Self::Text => "text-delta",
                Self::Code => "code-delta",
                Self::Sheet => "sheet-delta",
                Self::Image => "image-delta",
            }
        }
    }

    impl Display for DocumentKind {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.as_str())
        }
    }

    impl FromStr for DocumentKind {
        type Err = String;

        fn from_str(value: &str) -> Result<Self, Self::Err> {
            Self::ALL
                .into_iter()
                .find(|kind| kind.as_str() == value)
                .ok_or_else(|| format!("unknown document kind: '{value}'"))
        }
    }
}

pub mod model {
    //! Shared generation settings used by request types.
    //!
    //! ```rust
    //! use qcommon::GenerationOptions;
    //!
    //! let options = GenerationOptions::default()
    //!     .with_temperature(0.2)
    //!     .with_max_tokens(128)
    //!     .enable_streaming();
    //!
    //! assert_eq!(options.temperature, Some(0.2));
    //! assert_eq!(options.max_tokens, Some(128));
    //! assert!(options.stream);
    //! ```

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
        pub stream: bool,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }

        pub fn with_streaming(mut self, stream: bool) -> Self {
            self.stream = stream;
            self
        }

        pub fn enable_streaming(self) -> Self {
            self.with_streaming(true)
        }
    }
}

pub mod registry {
    //! Generic registry map wrapper used by runtime registries.
    //!
    //! ```rust
    //! use qcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("alpha".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! assert!(registry.contains_key("alpha"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub mod time {
    //! Timestamp helpers shared by storage and generation records.

    use chrono::{DateTime, SubsecRound, Utc};

    pub type Timestamp = DateTime<Utc>;

    /// Current time truncated to microseconds, the precision storage keeps.
    pub fn now() -> Timestamp {
        Utc::now().trunc_subsecs(6)
    }

    /// Lossless-to-the-microsecond conversion used by storage backends.
    pub fn to_micros(timestamp: &Timestamp) -> i64 {
        timestamp.timestamp_micros()
    }

    pub fn from_micros(micros: i64) -> Option<Timestamp> {
        DateTime::<Utc>::from_timestamp_micros(micros)
    }
}

pub use context::{ChatId, DocumentId, MessageId, MetadataMap, SuggestionId, UserId};
pub use future::BoxFuture;
pub use kind::DocumentKind;
pub use model::GenerationOptions;
pub use registry::Registry;
pub use time::Timestamp;
