//! Item use-case service.
//!
//! # Responsibility
//! - Create an item from human-readable natural keys.
//! - Keep the whole create flow inside one unit-of-work transaction.
//!
//! # Invariants
//! - Resolution order is extension, language, item type; the first failure
//!   wins and aborts the transaction.
//! - A failed call leaves no item row behind.
//! - The returned item is re-read after insert and fully loaded.

use crate::context::OpContext;
use crate::db::{Store, StoreError};
use crate::model::item::Item;
use crate::model::price::Price;
use crate::repo::extension_repo::ExtensionRepository;
use crate::repo::item_repo::ItemRepository;
use crate::repo::item_type_repo::ItemTypeRepository;
use crate::repo::language_repo::LanguageRepository;
use crate::repo::unit_of_work::{TxError, UnitOfWork};
use crate::repo::RepoError;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const SERVICE: &str = "item_service";
const CREATE_ITEM_OP: &str = "create_item";

/// Natural-key input of `create_item`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Extension,
    Language,
    ItemType,
}

impl Display for ItemField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extension => write!(f, "extension"),
            Self::Language => write!(f, "language"),
            Self::ItemType => write!(f, "item type"),
        }
    }
}

/// Service error for item use-cases.
#[derive(Debug)]
pub enum ItemServiceError {
    /// A natural-key input did not resolve to a reference row.
    Unresolved {
        field: ItemField,
        value: String,
        source: RepoError,
    },
    /// Inserting the item failed (constraint violation, store failure).
    CreateFailed(RepoError),
    /// The inserted item could not be read back.
    ReloadFailed(RepoError),
    /// The transaction could not begin or commit.
    Transaction(TxError),
}

impl ItemServiceError {
    /// Input field that failed to resolve, with the offending value.
    pub fn unresolved_field(&self) -> Option<(ItemField, &str)> {
        match self {
            Self::Unresolved { field, value, .. } => Some((*field, value.as_str())),
            _ => None,
        }
    }

    /// Innermost store failure behind this error, if any.
    pub fn root_store_error(&self) -> Option<&StoreError> {
        match self {
            Self::Unresolved { source, .. } => source.store_error(),
            Self::CreateFailed(source) | Self::ReloadFailed(source) => source.store_error(),
            Self::Transaction(err) => Some(&err.source),
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Unresolved { source, .. } => source.is_not_found(),
            Self::ReloadFailed(source) => source.is_not_found(),
            _ => false,
        }
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        self.root_store_error()
            .is_some_and(StoreError::is_deadline_exceeded)
    }
}

impl Display for ItemServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{SERVICE} {CREATE_ITEM_OP} failed: ")?;
        match self {
            Self::Unresolved {
                field,
                value,
                source,
            } if source.is_not_found() => write!(f, "{field} '{value}' not found ({source})"),
            Self::Unresolved {
                field,
                value,
                source,
            } => write!(f, "{field} '{value}' could not be resolved ({source})"),
            Self::CreateFailed(source) => write!(f, "failed to create item ({source})"),
            Self::ReloadFailed(source) => write!(f, "failed to load created item ({source})"),
            Self::Transaction(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ItemServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unresolved { source, .. } => Some(source),
            Self::CreateFailed(source) | Self::ReloadFailed(source) => Some(source),
            Self::Transaction(err) => Some(err),
        }
    }
}

impl From<TxError> for ItemServiceError {
    fn from(value: TxError) -> Self {
        Self::Transaction(value)
    }
}

/// Request model for `create_item`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateItemRequest {
    pub extension_code: String,
    pub language_code: String,
    pub item_type_name: String,
    pub price: Option<Price>,
}

/// Item service facade over the unit of work.
#[derive(Debug, Clone)]
pub struct ItemService {
    store: Store,
}

impl ItemService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Top-level unit of work for read-only calls outside a transaction.
    pub fn unit_of_work(&self) -> UnitOfWork<'_> {
        UnitOfWork::new(&self.store)
    }

    /// Creates one item identified by extension code, language code and
    /// item type name, and returns it with associations loaded.
    pub fn create_item(
        &self,
        ctx: &OpContext,
        extension_code: &str,
        language_code: &str,
        item_type_name: &str,
        price: Option<Price>,
    ) -> Result<Item, ItemServiceError> {
        let started_at = Instant::now();
        let outcome = self.unit_of_work().run(ctx, |uow| {
            let extension = uow
                .extensions()
                .find_by_code(ctx, extension_code)
                .map_err(|source| ItemServiceError::Unresolved {
                    field: ItemField::Extension,
                    value: extension_code.to_string(),
                    source,
                })?;

            let language = uow
                .languages()
                .find_by_code(ctx, language_code)
                .map_err(|source| ItemServiceError::Unresolved {
                    field: ItemField::Language,
                    value: language_code.to_string(),
                    source,
                })?;

            let item_type = uow
                .item_types()
                .find_by_name(ctx, item_type_name)
                .map_err(|source| ItemServiceError::Unresolved {
                    field: ItemField::ItemType,
                    value: item_type_name.to_string(),
                    source,
                })?;

            let mut item = Item::new(extension.id, item_type.id, language.id, price);
            uow.items()
                .create(ctx, &mut item)
                .map_err(ItemServiceError::CreateFailed)?;

            uow.items()
                .find_by_id(ctx, item.id)
                .map_err(ItemServiceError::ReloadFailed)
        });

        match &outcome {
            Ok(item) => info!(
                "event=item_create module=service status=ok item_id={} extension={} language={} type={} duration_ms={}",
                item.id,
                extension_code,
                language_code,
                item_type_name,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=item_create module=service status=error extension={} language={} type={} duration_ms={} error={}",
                extension_code,
                language_code,
                item_type_name,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        outcome
    }

    /// Same as `create_item`, taking a request model.
    pub fn create_item_from(
        &self,
        ctx: &OpContext,
        request: &CreateItemRequest,
    ) -> Result<Item, ItemServiceError> {
        self.create_item(
            ctx,
            &request.extension_code,
            &request.language_code,
            &request.item_type_name,
            request.price,
        )
    }
}
