use std::collections::HashMap;

use crate::domain::{
    chart::{ChartConfig, SurfaceId},
    errors::RenderingResult,
    logging::{LogComponent, get_logger},
};

/// A chart drawn on one surface. `dispose` detaches it (listeners, pixels) and
/// must tolerate being called more than once.
pub trait ChartInstance {
    fn surface(&self) -> SurfaceId;
    fn dispose(&mut self);
}

/// Creates chart instances on drawing surfaces.
pub trait ChartBackend {
    type Instance: ChartInstance;

    /// `false` while the surface is not mounted.
    fn surface_available(&self, surface: SurfaceId) -> bool;

    fn attach(&mut self, surface: SurfaceId, config: ChartConfig) -> RenderingResult<Self::Instance>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Attached { replaced: bool },
    SkippedUnmounted,
}

/// Owns the live chart instances, at most one per surface.
pub struct RenderAdapter<B: ChartBackend> {
    backend: B,
    live: HashMap<SurfaceId, B::Instance>,
}

impl<B: ChartBackend> RenderAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, live: HashMap::new() }
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Replace whatever is drawn on `surface` with `config`.
    ///
    /// The previous instance is disposed before the new one is attached. An
    /// unmounted surface is skipped, not an error.
    pub fn render(&mut self, surface: SurfaceId, config: ChartConfig) -> RenderingResult<RenderOutcome> {
        if !self.backend.surface_available(surface) {
            self.release(surface);
            get_logger().debug(
                LogComponent::Application("RenderAdapter"),
                &format!("Surface '{}' is not mounted, skipping {} points", surface, config.len()),
            );
            return Ok(RenderOutcome::SkippedUnmounted);
        }

        let replaced = self.release(surface);
        let points = config.len();
        let instance = self.backend.attach(surface, config)?;
        self.live.insert(surface, instance);

        get_logger().debug(
            LogComponent::Application("RenderAdapter"),
            &format!("📊 Attached {} ({} points, replaced: {})", surface, points, replaced),
        );
        Ok(RenderOutcome::Attached { replaced })
    }

    /// Dispose the instance on `surface`, if any.
    pub fn release(&mut self, surface: SurfaceId) -> bool {
        match self.live.remove(&surface) {
            Some(mut instance) => {
                instance.dispose();
                true
            }
            None => false,
        }
    }

    pub fn release_all(&mut self) {
        for (_, mut instance) in self.live.drain() {
            instance.dispose();
        }
    }

    pub fn is_live(&self, surface: SurfaceId) -> bool {
        self.live.contains_key(&surface)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl<B: ChartBackend> Drop for RenderAdapter<B> {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::AppError;
    use crate::domain::market_data::{TimeSeries, TimeSeriesPoint};
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    #[derive(Default)]
    struct Journal {
        events: Vec<String>,
    }

    struct FakeInstance {
        id: usize,
        surface: SurfaceId,
        journal: Rc<RefCell<Journal>>,
        disposed: bool,
    }

    impl ChartInstance for FakeInstance {
        fn surface(&self) -> SurfaceId {
            self.surface
        }

        fn dispose(&mut self) {
            if !self.disposed {
                self.disposed = true;
                self.journal.borrow_mut().events.push(format!("dispose #{}", self.id));
            }
        }
    }

    struct FakeBackend {
        mounted: HashSet<SurfaceId>,
        next_id: usize,
        journal: Rc<RefCell<Journal>>,
        fail: bool,
    }

    impl ChartBackend for FakeBackend {
        type Instance = FakeInstance;

        fn surface_available(&self, surface: SurfaceId) -> bool {
            self.mounted.contains(&surface)
        }

        fn attach(&mut self, surface: SurfaceId, _config: ChartConfig) -> RenderingResult<FakeInstance> {
            if self.fail {
                return Err(AppError::Rendering("no 2d context".to_string()));
            }
            self.next_id += 1;
            self.journal.borrow_mut().events.push(format!("attach #{} on {:?}", self.next_id, surface));
            Ok(FakeInstance { id: self.next_id, surface, journal: self.journal.clone(), disposed: false })
        }
    }

    fn adapter(mounted: &[SurfaceId]) -> (RenderAdapter<FakeBackend>, Rc<RefCell<Journal>>) {
        let journal = Rc::new(RefCell::new(Journal::default()));
        let backend = FakeBackend {
            mounted: mounted.iter().copied().collect(),
            next_id: 0,
            journal: journal.clone(),
            fail: false,
        };
        (RenderAdapter::new(backend), journal)
    }

    fn config() -> ChartConfig {
        ChartConfig::price_chart(&TimeSeries::new(vec![TimeSeriesPoint::new("2024-01-01", 1.0)]))
    }

    #[test]
    fn replaces_by_disposing_first() {
        let (mut adapter, journal) = adapter(&[SurfaceId::PriceChart]);
        assert_eq!(
            adapter.render(SurfaceId::PriceChart, config()).unwrap(),
            RenderOutcome::Attached { replaced: false }
        );
        assert_eq!(
            adapter.render(SurfaceId::PriceChart, config()).unwrap(),
            RenderOutcome::Attached { replaced: true }
        );
        assert_eq!(adapter.live_count(), 1);
        assert_eq!(
            journal.borrow().events,
            vec!["attach #1 on PriceChart", "dispose #1", "attach #2 on PriceChart"]
        );
    }

    #[test]
    fn unmounted_surface_is_skipped() {
        let (mut adapter, journal) = adapter(&[]);
        assert_eq!(
            adapter.render(SurfaceId::DailyReturnChart, config()).unwrap(),
            RenderOutcome::SkippedUnmounted
        );
        assert!(!adapter.is_live(SurfaceId::DailyReturnChart));
        assert!(journal.borrow().events.is_empty());
    }

    #[test]
    fn drop_disposes_everything() {
        let (mut adapter, journal) = adapter(&[SurfaceId::PriceChart, SurfaceId::DailyReturnChart]);
        adapter.render(SurfaceId::PriceChart, config()).unwrap();
        adapter.render(SurfaceId::DailyReturnChart, config()).unwrap();
        drop(adapter);
        let events = journal.borrow().events.clone();
        assert!(events.contains(&"dispose #1".to_string()));
        assert!(events.contains(&"dispose #2".to_string()));
    }

    #[test]
    fn attach_failure_leaves_surface_empty() {
        let (mut adapter, _journal) = adapter(&[SurfaceId::PriceChart]);
        adapter.render(SurfaceId::PriceChart, config()).unwrap();
        adapter.backend_mut().fail = true;
        assert!(adapter.render(SurfaceId::PriceChart, config()).is_err());
        assert!(!adapter.is_live(SurfaceId::PriceChart));
    }
}
