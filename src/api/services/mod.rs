pub mod health;
pub mod helpers;
pub mod redirect;
pub mod shorten;
pub mod stats;
pub mod user_urls;

pub use health::HealthService;
pub use redirect::RedirectService;
pub use shorten::{ShortenRequest, ShortenResponse, ShortenService};
pub use stats::StatsService;
pub use user_urls::UserUrlsService;
