//! This is the main abstraction of the crate: a Scenario is what a load
//! script implements, everything else (spawning, pacing, reporting) is the
//! runner's job.
use std::error::Error;

use async_trait::async_trait;

use crate::user::VirtualUser;

/// Which error should the implementation return?
pub type DynError = Box<dyn Error + Send + Sync + 'static>;

/// Scenario interface:
///
/// run is the fondamental method, it gets called once per iteration and
/// should issue the requests of that iteration through the VirtualUser.
/// Returning an Err is never fatal: the runner records a failed sample and
/// the loop goes on.
///
/// Then there is on_start, and is executed once per user before the first
/// iteration (login, warmup...).
#[async_trait]
pub trait Scenario: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// one-off setup for a user, default does nothing
    async fn on_start(&self, user: &mut VirtualUser) -> Result<(), DynError> {
        let _user = user;
        Ok(())
    }

    /// a single iteration of the send phase
    async fn run(&self, user: &mut VirtualUser) -> Result<(), DynError>;
}
