//! Page objects.
//!
//! Each page borrows the scenario's session and settings through a
//! [`BasePage`]. Locators are process-wide constants listing alternative
//! selectors; an element matches when any alternative matches.

mod base;
mod cart;
mod forgot_password;
mod home;
mod links;
mod login;
mod product;
mod registration;
mod search_results;
mod shop;
mod wishlist;

pub use base::BasePage;
pub(crate) use base::recover;
pub use cart::{CartItem, CartPage};
pub use forgot_password::ForgotPasswordPage;
pub use home::{FooterLink, HomePage, ProductCard, MAX_FEATURED};
pub use links::{Link, LinkError, LinkReport, MAX_LINKS_CHECKED};
pub use login::LoginPage;
pub use product::{ProductPage, ProductTab, Review, MAX_RELATED};
pub use registration::RegistrationPage;
pub use search_results::{Facet, ResultsView, SearchResult, SearchResultsPage};
pub use shop::{ShoeSize, ShopCategory, ShopPage, SortOrder};
pub use wishlist::{WishlistItem, WishlistPage};

use std::time::Duration;

use crate::config::{PageKind, Settings};
use crate::locator::Locator;
use crate::outcome::{Outcome, OutcomeProbe};
use crate::result::VitrineResult;
use crate::session::Session;

/// A view of the storefront with a canonical URL
pub trait PageObject<'s>: Sized {
    /// Which configured URL `load` opens
    const KIND: PageKind;

    /// Wrap a base page
    fn from_base(base: BasePage<'s>) -> Self;

    /// Shared operation vocabulary
    fn base(&self) -> &BasePage<'s>;

    /// Heuristic: URL fragment or landmark element
    fn is_loaded(&self) -> VitrineResult<bool>;

    /// Bind to a session
    fn new(session: &'s dyn Session, settings: &'s Settings) -> Self {
        Self::from_base(BasePage::new(session, settings))
    }

    /// Navigate to the page's canonical URL
    fn load(&self) -> VitrineResult<()> {
        tracing::info!(page = ?Self::KIND, "load");
        self.base().open(Self::KIND)
    }
}

/// Gather success, error and URL signals after a submit
///
/// The success indicator gets the confirmation budget, the error indicator
/// the shorter probe budget. Once the page has navigated away the error is
/// checked against the current document only.
pub(crate) fn probe_outcome(
    base: &BasePage<'_>,
    success: Option<&Locator>,
    error: &Locator,
    url_changed: bool,
) -> VitrineResult<Outcome> {
    let timeouts = base.settings().timeouts();
    let mut probe = OutcomeProbe::new().url_changed(url_changed);
    if let Some(success) = success {
        probe = probe.success(base.within(timeouts.confirm()).is_visible(success)?);
    }
    if !probe.success_visible {
        let budget = if url_changed {
            Duration::ZERO
        } else {
            timeouts.probe()
        };
        probe = probe.error(base.within(budget).visible_text(error)?);
    }
    let outcome = probe.classify(base.settings().outcome_policy());
    tracing::info!(%outcome, "action outcome");
    Ok(outcome)
}
