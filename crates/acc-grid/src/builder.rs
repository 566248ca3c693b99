//! Fluent builder for a [`GridAccessibility`].

use acc_core::{AccError, Mode};
use acc_spatial::{DijkstraRouter, MeasuringGrid, Network, Router, SpatialError};

use crate::config::AccessibilityConfig;
use crate::{GridAccessibility, GridResult};

/// Fluent builder for [`GridAccessibility<R>`].
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                                               |
/// |-----------------|-------------------------------------------------------|
/// | `.router(r)`    | `DijkstraRouter` with the configured speeds           |
/// | `.grid(g)`      | grid over `config.bounding_box`, else the network's   |
///
/// # Example
///
/// ```rust,ignore
/// let acc = GridAccessibilityBuilder::new(config, &network).build()?;
/// let result = acc.compute(&opportunities, &facilities)?;
/// ```
pub struct GridAccessibilityBuilder<'a, R: Router> {
    config:  AccessibilityConfig,
    network: &'a Network,
    router:  R,
    grid:    Option<MeasuringGrid>,
}

impl<'a> GridAccessibilityBuilder<'a, DijkstraRouter> {
    pub fn new(config: AccessibilityConfig, network: &'a Network) -> Self {
        let router = DijkstraRouter::new(config.speeds);
        Self { config, network, router, grid: None }
    }
}

impl<'a, R: Router> GridAccessibilityBuilder<'a, R> {
    /// Swap the routing engine.
    pub fn router<R2: Router>(self, router: R2) -> GridAccessibilityBuilder<'a, R2> {
        GridAccessibilityBuilder {
            config:  self.config,
            network: self.network,
            router,
            grid:    self.grid,
        }
    }

    /// Use a prebuilt measuring grid instead of deriving one.
    pub fn grid(mut self, grid: MeasuringGrid) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Validate inputs and lay out the measuring grid.
    pub fn build(self) -> GridResult<GridAccessibility<'a, R>> {
        if self.config.modes.is_empty() {
            return Err(AccError::Config("no accessibility modes enabled".into()).into());
        }
        if self.network.is_empty() {
            return Err(SpatialError::EmptyNetwork.into());
        }
        if self.config.modes.contains(&Mode::Car) && !self.network.has_congested_times() {
            log::warn!("car accessibility requested without congested travel times; using free speed");
        }

        let grid = match (self.grid, self.config.bounding_box) {
            (Some(grid), _) => grid,
            (None, Some(bbox)) => MeasuringGrid::new(bbox, self.config.cell_size, self.network)?,
            (None, None) => MeasuringGrid::over_network(self.network, self.config.cell_size)?,
        };

        Ok(GridAccessibility {
            config:  self.config,
            network: self.network,
            router:  self.router,
            grid,
        })
    }
}
