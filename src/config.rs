//! Mechanism for loading and sharing the job configuration
//!
//! The configuration file holds one `name value...` entry per line. Blank
//! lines and `#` comments are ignored, list-valued parameters take several
//! whitespace-separated values, and a lone `''` stands for an empty list.
//! Every parameter except the selector name and the simulation flag has a
//! default matching the reference analysis job.

use crate::{
    classifier::ClassifierConfig,
    selector::{vertex::PvConfig, SelectorConfig},
    Result,
};

use eyre::{bail, ensure, eyre, WrapErr};

use std::{collections::BTreeMap, fs, path::Path, str::FromStr};

/// Empty list placeholder
const EMPTY_LIST: &str = "''";

/// Job configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Registered name of the event selector
    pub selector: String,

    /// Registered names of the event calculators
    pub calculators: Vec<String>,

    /// Whether an event lacking an input collection stops the whole job
    /// (otherwise it is reported and skipped)
    pub abort_on_missing: bool,

    /// Event selection configuration
    pub selector_config: SelectorConfig,

    /// Decay chain classification configuration
    pub classifier: ClassifierConfig,
}
//
impl Configuration {
    /// Load the configuration from a file, check it, and print it out
    pub fn load(file_name: impl AsRef<Path>) -> Result<Self> {
        let file_name = file_name.as_ref();
        let config_str = fs::read_to_string(file_name)
            .wrap_err_with(|| format!("Could not read {}", file_name.display()))?;
        let config = Self::parse(&config_str)?;
        config.print();
        Ok(config)
    }

    /// Decode and check a configuration
    pub fn parse(config_str: &str) -> Result<Self> {
        let mut items = ConfigItems::new(config_str)?;

        // Mandatory parameters
        let selector = items.required("selector")?.parse_string()?;
        let mut selector_config = SelectorConfig {
            is_mc: items.required("is_mc")?.parse_bool()?,
            ..SelectorConfig::default()
        };

        // Job-level options
        let mut calculators = Vec::new();
        items.set_list("calculators", &mut calculators)?;
        let mut abort_on_missing = false;
        items.set_bool("abort_on_missing", &mut abort_on_missing)?;

        // Selector options
        let sel = &mut selector_config;
        items.set_bool("debug", &mut sel.debug)?;

        items.set_string("hlt_collection", &mut sel.tags.hlt)?;
        items.set_bool("trigger_cut", &mut sel.trigger.enabled)?;
        items.set_bool("dump_trigger", &mut sel.trigger.dump_menu)?;
        items.set_list("mctrigger_path_el", &mut sel.trigger.mc_paths_el)?;
        items.set_list("mctrigger_path_mu", &mut sel.trigger.mc_paths_mu)?;
        items.set_list("trigger_path_el", &mut sel.trigger.data_paths_el)?;
        items.set_list("trigger_path_mu", &mut sel.trigger.data_paths_mu)?;

        let pv = &mut sel.pv;
        items.set_bool("pv_cut", &mut pv.enabled)?;
        items.set_string("pv_src", &mut pv.source)?;
        items.set("pv_npv", &mut pv.npv)?;
        items.set("pv_min_ndof", &mut pv.min_ndof)?;
        items.set("pv_max_z", &mut pv.max_z)?;
        items.set("pv_max_rho", &mut pv.max_rho)?;

        items.set_bool("metfilters", &mut sel.met_filters)?;
        items.set_string("flag_tag", &mut sel.tags.met_filters)?;
        items.set_string("metfilter_extra", &mut sel.tags.met_filter_extra)?;

        items.set_bool("met_cuts", &mut sel.met.enabled)?;
        items.set("min_met", &mut sel.met.min_met)?;
        items.set("max_met", &mut sel.met.max_met)?;
        items.set_string("met_collection", &mut sel.tags.met)?;

        let muon_id = &mut sel.muon_id;
        items.set_string("muons_collection", &mut sel.tags.muons)?;
        items.set_bool("muon_cuts", &mut muon_id.enabled)?;
        items.set_bool("muon_use_mini_iso", &mut muon_id.use_mini_iso)?;
        items.set("muon_minpt", &mut muon_id.tight.min_pt)?;
        items.set("muon_maxeta", &mut muon_id.tight.max_eta)?;
        items.set("muon_dxy", &mut muon_id.tight.dxy)?;
        items.set("muon_dz", &mut muon_id.tight.dz)?;
        items.set("muon_rel_iso", &mut muon_id.tight.rel_iso)?;
        items.set("loose_muon_minpt", &mut muon_id.loose.min_pt)?;
        items.set("loose_muon_maxeta", &mut muon_id.loose.max_eta)?;
        items.set("loose_muon_dxy", &mut muon_id.loose.dxy)?;
        items.set("loose_muon_dz", &mut muon_id.loose.dz)?;
        items.set("loose_muon_rel_iso", &mut muon_id.loose.rel_iso)?;

        let leptons = &mut sel.leptons;
        items.set_string("electrons_collection", &mut sel.tags.electrons)?;
        items.set("min_leptons", &mut leptons.min_leptons)?;
        items.set("min_mu_pt", &mut leptons.muon.min_pt)?;
        items.set("max_mu_eta", &mut leptons.muon.max_eta)?;
        items.set("min_el_pt", &mut leptons.electron.min_pt)?;
        items.set("max_el_eta", &mut leptons.electron.max_eta)?;

        // Classifier options
        let mut classifier = ClassifierConfig::default();
        items.set_bool("calc_debug", &mut classifier.debug)?;
        items.set_string("gen_particles_collection", &mut classifier.gen_particles)?;

        // Anything left over is a typo or an unsupported option
        items.finish()?;

        let config = Self {
            selector,
            calculators,
            abort_on_missing,
            selector_config,
            classifier,
        };
        config.check()?;
        Ok(config)
    }

    /// Sanity checks which do not fit the parsing of a single parameter
    fn check(&self) -> Result<()> {
        let sel = &self.selector_config;
        let thresholds = [
            ("pv_min_ndof", sel.pv.min_ndof),
            ("pv_max_z", sel.pv.max_z),
            ("pv_max_rho", sel.pv.max_rho),
            ("min_met", sel.met.min_met),
            ("max_met", sel.met.max_met),
            ("muon_minpt", sel.muon_id.tight.min_pt),
            ("muon_maxeta", sel.muon_id.tight.max_eta),
            ("muon_dxy", sel.muon_id.tight.dxy),
            ("muon_dz", sel.muon_id.tight.dz),
            ("muon_rel_iso", sel.muon_id.tight.rel_iso),
            ("loose_muon_minpt", sel.muon_id.loose.min_pt),
            ("loose_muon_maxeta", sel.muon_id.loose.max_eta),
            ("loose_muon_dxy", sel.muon_id.loose.dxy),
            ("loose_muon_dz", sel.muon_id.loose.dz),
            ("loose_muon_rel_iso", sel.muon_id.loose.rel_iso),
            ("min_mu_pt", sel.leptons.muon.min_pt),
            ("max_mu_eta", sel.leptons.muon.max_eta),
            ("min_el_pt", sel.leptons.electron.min_pt),
            ("max_el_eta", sel.leptons.electron.max_eta),
        ];
        for (name, value) in thresholds {
            ensure!(value.is_finite(), "Configuration of {} must be finite", name);
        }
        ensure!(
            sel.met.min_met < sel.met.max_met,
            "The MET window [{}, {}] is empty",
            sel.met.min_met,
            sel.met.max_met
        );
        ensure!(!self.selector.is_empty(), "Please name an event selector");
        Ok(())
    }

    /// Display the configuration
    pub fn print(&self) {
        let sel = &self.selector_config;
        let PvConfig {
            enabled: pv_cut,
            source: pv_src,
            npv,
            min_ndof,
            max_z,
            max_rho,
        } = &sel.pv;
        let tight = &sel.muon_id.tight;
        let loose = &sel.muon_id.loose;
        println!("selector             : {}", self.selector);
        println!("calculators          : {}", self.calculators.join(" "));
        println!("abort_on_missing     : {}", self.abort_on_missing);
        println!("is_mc                : {}", sel.is_mc);
        println!("debug                : {}", sel.debug);
        println!("hlt_collection       : {}", sel.tags.hlt);
        println!("trigger_cut          : {}", sel.trigger.enabled);
        println!("dump_trigger         : {}", sel.trigger.dump_menu);
        println!("mctrigger_path_el    : {}", sel.trigger.mc_paths_el.join(" "));
        println!("mctrigger_path_mu    : {}", sel.trigger.mc_paths_mu.join(" "));
        println!("trigger_path_el      : {}", sel.trigger.data_paths_el.join(" "));
        println!("trigger_path_mu      : {}", sel.trigger.data_paths_mu.join(" "));
        println!("pv_cut               : {}", pv_cut);
        println!("pv_src               : {}", pv_src);
        println!("pv_npv               : {}", npv);
        println!("pv_min_ndof          : {}", min_ndof);
        println!("pv_max_z             : {}", max_z);
        println!("pv_max_rho           : {}", max_rho);
        println!("metfilters           : {}", sel.met_filters);
        println!("flag_tag             : {}", sel.tags.met_filters);
        println!("metfilter_extra      : {}", sel.tags.met_filter_extra);
        println!("met_cuts             : {}", sel.met.enabled);
        println!("min_met              : {}", sel.met.min_met);
        println!("max_met              : {}", sel.met.max_met);
        println!("met_collection       : {}", sel.tags.met);
        println!("muons_collection     : {}", sel.tags.muons);
        println!("muon_cuts            : {}", sel.muon_id.enabled);
        println!("muon_use_mini_iso    : {}", sel.muon_id.use_mini_iso);
        println!("muon_minpt           : {}", tight.min_pt);
        println!("muon_maxeta          : {}", tight.max_eta);
        println!("muon_dxy             : {}", tight.dxy);
        println!("muon_dz              : {}", tight.dz);
        println!("muon_rel_iso         : {}", tight.rel_iso);
        println!("loose_muon_minpt     : {}", loose.min_pt);
        println!("loose_muon_maxeta    : {}", loose.max_eta);
        println!("loose_muon_dxy       : {}", loose.dxy);
        println!("loose_muon_dz        : {}", loose.dz);
        println!("loose_muon_rel_iso   : {}", loose.rel_iso);
        println!("electrons_collection : {}", sel.tags.electrons);
        println!("min_leptons          : {}", sel.leptons.min_leptons);
        println!("min_mu_pt            : {}", sel.leptons.muon.min_pt);
        println!("max_mu_eta           : {}", sel.leptons.muon.max_eta);
        println!("min_el_pt            : {}", sel.leptons.electron.min_pt);
        println!("max_el_eta           : {}", sel.leptons.electron.max_eta);
        println!("calc_debug           : {}", self.classifier.debug);
        println!("gen_particles        : {}", self.classifier.gen_particles);
    }
}

/// Entries of a configuration file, consumed as they are decoded
struct ConfigItems<'data> {
    /// Entries which were not decoded yet, by parameter name
    items: BTreeMap<&'data str, ConfigItem<'data>>,
}
//
impl<'data> ConfigItems<'data> {
    /// Split a configuration file into entries
    fn new(config_str: &'data str) -> Result<Self> {
        let mut items = BTreeMap::new();
        for (line_idx, line) in config_str.lines().enumerate() {
            let content = line.split('#').next().unwrap_or_default();
            let mut tokens = content.split_whitespace();
            let Some(name) = tokens.next() else {
                continue;
            };
            let item = ConfigItem {
                name,
                line: line_idx + 1,
                data: tokens.collect(),
            };
            if let Some(previous) = items.insert(name, item) {
                bail!(
                    "Parameter {} is configured twice (lines {} and {})",
                    name,
                    previous.line,
                    line_idx + 1
                );
            }
        }
        Ok(Self { items })
    }

    /// Take out a parameter which must be configured
    fn required(&mut self, name: &str) -> Result<ConfigItem<'data>> {
        self.items
            .remove(name)
            .ok_or_else(|| eyre!("Missing configuration of {}", name))
    }

    /// Overwrite a default with the configured value, if any
    fn set<T: FromStr>(&mut self, name: &str, target: &mut T) -> Result<()>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        if let Some(item) = self.items.remove(name) {
            *target = item.parse()?;
        }
        Ok(())
    }

    /// Like `set()`, for booleans
    fn set_bool(&mut self, name: &str, target: &mut bool) -> Result<()> {
        if let Some(item) = self.items.remove(name) {
            *target = item.parse_bool()?;
        }
        Ok(())
    }

    /// Like `set()`, for strings
    fn set_string(&mut self, name: &str, target: &mut String) -> Result<()> {
        if let Some(item) = self.items.remove(name) {
            *target = item.parse_string()?;
        }
        Ok(())
    }

    /// Like `set()`, for lists of strings
    fn set_list(&mut self, name: &str, target: &mut Vec<String>) -> Result<()> {
        if let Some(item) = self.items.remove(name) {
            *target = item.parse_list()?;
        }
        Ok(())
    }

    /// Check that every configured parameter was used
    fn finish(self) -> Result<()> {
        if self.items.is_empty() {
            return Ok(());
        }
        let unknown = self
            .items
            .values()
            .map(|item| format!("{} (line {})", item.name, item.line))
            .collect::<Vec<_>>();
        bail!("Unknown configuration parameters: {}", unknown.join(", "))
    }
}

/// A value from the configuration file, tagged with the parameter name and
/// line number for error reporting purposes.
struct ConfigItem<'data> {
    name: &'data str,
    line: usize,
    data: Vec<&'data str>,
}
//
impl<'data> ConfigItem<'data> {
    /// Extract the single value of a scalar parameter
    fn scalar(&self) -> Result<&'data str> {
        match self.data[..] {
            [value] => Ok(value),
            [] => bail!("No value given for {} (line {})", self.name, self.line),
            _ => bail!(
                "Expected a single value for {} (line {}), got {}",
                self.name,
                self.line,
                self.data.len()
            ),
        }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        self.scalar()?
            .parse::<T>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }

    /// Parse this data using special logic which handles Python's bool syntax
    fn parse_bool(self) -> Result<bool> {
        match self.scalar()? {
            "True" => Ok(true),
            "False" => Ok(false),
            _ => self.parse::<bool>(),
        }
    }

    /// Take this data as a string, without interpretation
    fn parse_string(self) -> Result<String> {
        self.scalar().map(str::to_owned)
    }

    /// Take this data as a list of strings
    fn parse_list(self) -> Result<Vec<String>> {
        if self.data == [EMPTY_LIST] {
            return Ok(Vec::new());
        }
        ensure!(
            !self.data.is_empty(),
            "No value given for {} (line {}), use {} for an empty list",
            self.name,
            self.line,
            EMPTY_LIST
        );
        ensure!(
            !self.data.contains(&EMPTY_LIST),
            "The {} placeholder of {} (line {}) cannot be mixed with other values",
            EMPTY_LIST,
            self.name,
            self.line
        );
        Ok(self.data.into_iter().map(str::to_owned).collect())
    }
}
