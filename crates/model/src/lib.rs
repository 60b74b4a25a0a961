//! Models, masked views and instances.
//!
//! - **[`Model`]** declares fields over stored records. A field is a constant, an
//!   alias of one storage property, or a full [`FieldDescriptor`] with getter,
//!   setter, translate handler, validators and the properties it `requires`.
//! - **[`MaskedView`]** narrows a model (or another view) to a field selection.
//! - **[`Instance`]** binds record data to a view, tracks modifications against the
//!   last persisted snapshot, and saves or deletes through the model's store.
//!
//! Field and dependency queries return `Option`: `None` means "not applicable
//! here" and is never an error. Failures that are errors (validation, store,
//! identity resolution) surface as [`ModelError`].

mod error;
mod field;
mod instance;
mod masked;
mod model;
mod validation;
pub mod validators;
mod view;

pub use error::{ModelError, ModelErrorExt};
pub use field::{
    AliasField, FieldDescriptor, FieldInfo, FieldSpec, Getter, IntoFieldDescriptor, Setter,
    Translator,
};
pub use instance::Instance;
pub use keel_mask::{FieldMask, PropertyMask};
pub use keel_store::Record;
pub use masked::MaskedView;
pub use model::Model;
pub use validation::{ValidationResult, Validator};
pub use view::{FindQuery, ModelView};
