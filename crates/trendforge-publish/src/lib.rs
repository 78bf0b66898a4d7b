//! Marketplace publishing: platform clients and the dispatcher that fans a
//! product draft out to the requested platforms.

pub mod dispatcher;
pub mod error;
pub mod etsy;
pub mod pinterest;

pub use dispatcher::{
    dispatch, DispatchOptions, DispatchReport, PlatformPublisher, ProductSnapshot, PublishOutcome,
};
pub use error::PublishError;
pub use etsy::{EtsyClient, EtsyCredentials, EtsyPublisher};
pub use pinterest::{PinterestClient, PinterestCredentials, PinterestPublisher};
