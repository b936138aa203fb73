mod datasource;
mod driver;
mod error;
pub mod extension;
mod factory;
mod field;
mod params;
mod types;
mod view;

pub use bson::{Bson, Document};
pub use datasource::DataSource;
pub use driver::{Driver, DriverError, ResultSet};
pub use error::{DataSourceError, ViewError};
pub use extension::{
    BindContext, BoundState, CoreExtension, Extension, FormExtension, ORDERING,
    OrderingExtension, OrderingRule, PaginationExtension, ParamContext, ViewContext,
};
pub use factory::DataSourceFactory;
pub use field::{FIELD_MAPPING, Field};
pub use params::{FIELDS, MAX_RESULTS, PAGE};
pub use types::{FieldTypeDef, FieldTypeRegistry};
pub use view::{DataSourceView, FieldView, ViewCursor};
