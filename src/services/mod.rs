pub mod catalog;
pub mod feed;
pub mod groups;
pub mod invitations;
pub mod merge;
pub mod providers;
pub mod reviews;
pub mod search;
