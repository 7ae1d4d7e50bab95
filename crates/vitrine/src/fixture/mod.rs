//! In-memory browser backend.
//!
//! A [`FixtureSite`] maps paths to [`FixtureDocument`] factories; a
//! [`FixtureSession`] navigates it like a browser would: clicks follow
//! links or fire handlers, handles go stale on navigation, elements can
//! appear late and documents can report `loading` for a while.
//!
//! [`storefront`] builds the bundled demo shop used for offline runs.

mod css;
mod document;
mod session;
pub mod storefront;
mod xpath;

pub use css::CssSelector;
pub use document::{Effect, El, FixtureDocument, Handler, Node, NodeId, DEFAULT_ELEMENT_SIZE};
pub use session::{percent_encode, FixtureProvider, FixtureSession, FixtureSite, PageFactory, Request};
pub use storefront::{
    storefront, CartLine, Product, StoreState, CATALOG, DEMO_EMAIL, DEMO_PASSWORD, DISCOUNT_CODE,
    MAX_LINE_QUANTITY, STOREFRONT_ORIGIN,
};
pub use xpath::XPath;
