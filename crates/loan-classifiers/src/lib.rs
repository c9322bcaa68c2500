//! loan-classifiers: loan eligibility scoring.
//!
//! The crate has two halves. `training` reads a historical loan dataset,
//! imputes missing cells, encodes and scales the features and fits an RBF
//! support-vector classifier, then persists encoder, scaler and model as
//! three artifacts. `decision` loads those artifacts and answers one
//! applicant at a time, applying knockout rules before consulting the model.
//!
//! Both halves share the column layout in `schema`.
pub mod applicant;
pub mod config;
pub mod data_handling;
pub mod decision;
pub mod error;
pub mod io;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod schema;
pub mod training;
