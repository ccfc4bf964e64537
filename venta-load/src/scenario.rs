use harness::prelude::*;

use crate::venta::random_venta;

/// The load script: every iteration rolls a random sale and posts it to
/// /venta. Failed requests are recorded by the harness, so there is nothing
/// to propagate from here.
pub struct VentaScenario;

#[async_trait]
impl Scenario for VentaScenario {
    fn name(&self) -> &str {
        "venta"
    }

    async fn run(&self, user: &mut VirtualUser) -> Result<(), DynError> {
        let venta = random_venta(user.rng());
        user.post_json("/venta", &venta).await;
        Ok(())
    }
}
