mod document;
mod driver;
mod negotiation;
mod offer;
mod order;
mod party;
mod passenger;
mod rating;

pub use document::{meets_requirements, Category, Document, Status as DocumentStatus};
pub use driver::{Driver, Vehicle};
pub use negotiation::{Negotiation, Status as NegotiationStatus};
pub use offer::{Offer, Status as OfferStatus};
pub use order::{Order, Status as OrderStatus};
pub use party::Party;
pub use passenger::Passenger;
pub use rating::{average_score, default_rating, Rating};
