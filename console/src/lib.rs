//! TutorLink staff console library.
//!
//! Client-side state layer for the TutorLink placement dashboard. The
//! admin API is polled on an interval, a push channel supplies live
//! events between polls, and staff decisions write through to the server
//! before touching local state.
//!
//! ## Architecture
//!
//! - **StateStore**: Single merge point for vacancies, teachers and the
//!   applicants roster, with locally pinned statuses
//! - **Synchronizer**: Periodic fetch-merge-commit loop
//! - **LiveListener**: Push channel state machine applying messages in
//!   arrival order
//! - **StatusPropagator / VacancyManager**: Persist-then-update staff
//!   actions
//! - **Commands**: The `tutorlink` CLI surface

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod live;
pub mod notify;
pub mod output;
pub mod propagate;
pub mod search;
pub mod session;
pub mod state;
pub mod sync;
pub mod vacancies;
