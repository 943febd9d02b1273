pub mod add;
pub mod cards;
pub mod config;
pub mod export;
pub mod goal;
pub mod history;
pub mod projects;
pub mod review;
pub mod stats;
pub mod sync;
