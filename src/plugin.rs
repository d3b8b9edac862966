//! Event processing components which can be looked up by name
//!
//! The job configuration names one selector and any number of calculators.
//! The registry maps those names to constructors, so that new components can
//! be plugged in without touching the job driver.

use crate::{
    classifier::{self, TpTpCalc},
    config::Configuration,
    cutflow::CutSet,
    event::Event,
    selector::{self, MultiLepSelector, Selection},
    sink::OutputSink,
    Result,
};

use eyre::{bail, eyre};

use std::{collections::BTreeMap, sync::Arc};

/// Component deciding whether events pass a cut chain
pub trait EventSelector: Send {
    /// Registered name
    fn name(&self) -> &str;

    /// Cut chain, in evaluation order
    fn cuts(&self) -> &Arc<CutSet>;

    /// Evaluate the cut chain on one event
    ///
    /// Missing input collections are reported as errors.
    ///
    fn evaluate(&mut self, event: &Event) -> Result<Selection>;
}

/// Component computing per-event output values
pub trait EventClassifier: Send {
    /// Registered name
    fn name(&self) -> &str;

    /// Compute the output values of one event, given its selection outcome
    fn analyze(
        &mut self,
        event: &Event,
        selection: &Selection,
        sink: &mut dyn OutputSink,
    ) -> Result<()>;
}
//
impl EventSelector for MultiLepSelector {
    fn name(&self) -> &str {
        selector::SELECTOR_NAME
    }

    fn cuts(&self) -> &Arc<CutSet> {
        MultiLepSelector::cuts(self)
    }

    fn evaluate(&mut self, event: &Event) -> Result<Selection> {
        MultiLepSelector::evaluate(self, event)
    }
}
//
impl EventClassifier for TpTpCalc {
    fn name(&self) -> &str {
        classifier::CALCULATOR_NAME
    }

    fn analyze(
        &mut self,
        event: &Event,
        _selection: &Selection,
        sink: &mut dyn OutputSink,
    ) -> Result<()> {
        self.classify(event).publish(sink);
        Ok(())
    }
}

/// Constructor of a selector
pub type SelectorFactory = fn(&Configuration) -> Result<Box<dyn EventSelector>>;

/// Constructor of a calculator
pub type ClassifierFactory = fn(&Configuration) -> Result<Box<dyn EventClassifier>>;

/// Name to constructor mapping
#[derive(Clone, Default)]
pub struct Registry {
    /// Selector constructors
    selectors: BTreeMap<String, SelectorFactory>,

    /// Calculator constructors
    classifiers: BTreeMap<String, ClassifierFactory>,
}
//
impl Registry {
    /// Start with an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the components of this crate
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.selectors.insert(
            selector::SELECTOR_NAME.to_owned(),
            |cfg: &Configuration| -> Result<Box<dyn EventSelector>> {
                Ok(Box::new(MultiLepSelector::new(cfg.selector_config.clone())?))
            },
        );
        registry.classifiers.insert(
            classifier::CALCULATOR_NAME.to_owned(),
            |cfg: &Configuration| -> Result<Box<dyn EventClassifier>> {
                Ok(Box::new(TpTpCalc::new(cfg.classifier.clone())))
            },
        );
        registry
    }

    /// Make a selector available under a name
    pub fn register_selector(&mut self, name: &str, factory: SelectorFactory) -> Result<()> {
        if self.selectors.contains_key(name) {
            bail!("Selector {} is already registered", name);
        }
        self.selectors.insert(name.to_owned(), factory);
        Ok(())
    }

    /// Make a calculator available under a name
    pub fn register_classifier(&mut self, name: &str, factory: ClassifierFactory) -> Result<()> {
        if self.classifiers.contains_key(name) {
            bail!("Calculator {} is already registered", name);
        }
        self.classifiers.insert(name.to_owned(), factory);
        Ok(())
    }

    /// Build the selector registered under a name
    pub fn make_selector(&self, name: &str, cfg: &Configuration) -> Result<Box<dyn EventSelector>> {
        let factory = self.selectors.get(name).ok_or_else(|| {
            eyre!(
                "Unknown selector {} (available: {})",
                name,
                join_names(self.selectors.keys())
            )
        })?;
        factory(cfg)
    }

    /// Build the calculator registered under a name
    pub fn make_classifier(
        &self,
        name: &str,
        cfg: &Configuration,
    ) -> Result<Box<dyn EventClassifier>> {
        let factory = self.classifiers.get(name).ok_or_else(|| {
            eyre!(
                "Unknown calculator {} (available: {})",
                name,
                join_names(self.classifiers.keys())
            )
        })?;
        factory(cfg)
    }

    /// Build every calculator named by the configuration, in order
    pub fn make_classifiers(&self, cfg: &Configuration) -> Result<Vec<Box<dyn EventClassifier>>> {
        cfg.calculators
            .iter()
            .map(|name| self.make_classifier(name, cfg))
            .collect()
    }
}

/// List registered names for error messages
fn join_names<'a>(names: impl Iterator<Item = &'a String>) -> String {
    names.map(String::as_str).collect::<Vec<_>>().join(", ")
}
