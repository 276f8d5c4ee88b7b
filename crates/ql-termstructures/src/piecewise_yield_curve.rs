//! `PiecewiseYieldCurve` — iterative bootstrap construction of a yield curve
//! (translates `ql/termstructures/yield/piecewiseyieldcurve.hpp` and
//! `ql/termstructures/iterativebootstrap.hpp`).
//!
//! Helpers are sorted by pillar date and each pillar becomes a node of an
//! [`InterpolatedYieldCurve`].  Nodes are solved one at a time with Brent's
//! method, holding earlier nodes fixed, on a curve made of the nodes known
//! so far.  Cubic interpolators couple the nodes: a node also moves the
//! curve before it.  Their nodes are first solved one by one under the
//! (log-)linear counterpart of the scheme, then jointly with
//! Levenberg–Marquardt until every helper reprices within
//! [`BootstrapConfig::global_accuracy`].
//!
//! # Example
//!
//! ```
//! use ql_termstructures::{
//!     BootstrapConfig, CurveStrategy, CurveTraits, DepositRateHelper, Interpolator,
//!     PiecewiseYieldCurve, RateHelper, YieldTermStructure,
//! };
//! use ql_time::{Date, DayCounter};
//! use std::sync::Arc;
//!
//! let today = Date::from_ymd(2025, 1, 2).unwrap();
//! let helpers: Vec<Arc<dyn RateHelper>> = vec![
//!     Arc::new(DepositRateHelper::new(0.040, today, Date::from_ymd(2025, 4, 2).unwrap(), DayCounter::Actual360)),
//!     Arc::new(DepositRateHelper::new(0.045, today, Date::from_ymd(2025, 7, 2).unwrap(), DayCounter::Actual360)),
//! ];
//! let curve = PiecewiseYieldCurve::new(
//!     today,
//!     helpers,
//!     DayCounter::Actual365Fixed,
//!     CurveStrategy::new(CurveTraits::Discount, Interpolator::LogLinear),
//!     BootstrapConfig::default(),
//! )
//! .unwrap();
//! assert!(curve.discount(0.4).unwrap() < 1.0);
//! ```

use crate::curve_strategy::{CurveStrategy, CurveTraits};
use crate::interpolated_yield_curve::InterpolatedYieldCurve;
use crate::rate_helpers::RateHelper;
use crate::term_structure::{TermStructure, TermStructureBase};
use crate::yield_term_structure::{Jumps, YieldTermStructure};
use ql_core::errors::{Error, Result};
use ql_core::{DiscountFactor, Rate, Real, Time};
use ql_math::{
    Array, Brent, Constraint, CostFunction, EndCriteria, LevenbergMarquardt, NoConstraint, OptimizationMethod,
    PositiveConstraint,
};
use ql_quotes::QuoteHandle;
use ql_time::{Calendar, Date, DayCounter};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Rate used to seed the first node.
const INITIAL_RATE_GUESS: Rate = 0.02;

/// Half-width of the first search bracket, in forward-rate units.
const INITIAL_BRACKET_WIDTH: Real = 0.05;

// ── Configuration ─────────────────────────────────────────────────────────────

/// Solver settings for the bootstrap.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BootstrapConfig {
    /// Brent accuracy on each node value.
    pub accuracy: Real,
    /// Brent evaluation budget per node.
    pub max_iterations: usize,
    /// Maximum number of joint iterations for cubic interpolators.
    pub max_global_iterations: usize,
    /// Number of times the search bracket may be doubled.
    pub bracket_expansions: usize,
    /// Largest quote residual accepted from the joint solve.
    pub global_accuracy: Real,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            accuracy: 1.0e-12,
            max_iterations: 100,
            max_global_iterations: 50,
            bracket_expansions: 10,
            global_accuracy: 1.0e-10,
        }
    }
}

// ── Curve ─────────────────────────────────────────────────────────────────────

/// A yield curve bootstrapped from rate helpers.
///
/// Corresponds to `QuantLib::PiecewiseYieldCurve<Traits, Interpolator>`.
#[derive(Debug, Clone)]
pub struct PiecewiseYieldCurve {
    curve: InterpolatedYieldCurve,
    helpers: Vec<Arc<dyn RateHelper>>,
    global_iterations: usize,
}

impl PiecewiseYieldCurve {
    /// Bootstrap a curve with a null calendar, no jumps and no
    /// extrapolation.
    ///
    /// # Errors
    /// See [`PiecewiseYieldCurveBuilder::build`].
    pub fn new(
        reference_date: Date,
        helpers: Vec<Arc<dyn RateHelper>>,
        day_counter: DayCounter,
        strategy: CurveStrategy,
        config: BootstrapConfig,
    ) -> Result<Self> {
        Self::builder(reference_date, day_counter, strategy)
            .config(config)
            .build(helpers)
    }

    /// Start configuring a bootstrap.
    pub fn builder(reference_date: Date, day_counter: DayCounter, strategy: CurveStrategy) -> PiecewiseYieldCurveBuilder {
        PiecewiseYieldCurveBuilder {
            reference_date,
            day_counter,
            strategy,
            calendar: Calendar::Null,
            jumps: Vec::new(),
            jump_dates: Vec::new(),
            config: BootstrapConfig::default(),
            extrapolate: false,
        }
    }

    /// The bootstrapped interpolated curve.
    pub fn curve(&self) -> &InterpolatedYieldCurve {
        &self.curve
    }

    /// The helpers, sorted by pillar date.
    pub fn helpers(&self) -> &[Arc<dyn RateHelper>] {
        &self.helpers
    }

    /// Iterations of the joint solve (0 for local interpolators).
    pub fn global_iterations(&self) -> usize {
        self.global_iterations
    }

    /// Node times.
    pub fn times(&self) -> &[Time] {
        self.curve.times()
    }

    /// Node dates.
    pub fn dates(&self) -> &[Date] {
        self.curve.dates()
    }

    /// Solved node values.
    pub fn data(&self) -> &[Real] {
        self.curve.data()
    }

    /// `(date, value)` pairs.
    pub fn nodes(&self) -> Vec<(Date, Real)> {
        self.curve.nodes()
    }

    /// Jump times.
    pub fn jump_times(&self) -> &[Time] {
        self.curve.jump_times()
    }

    /// Jump dates.
    pub fn jump_dates(&self) -> &[Date] {
        self.curve.jump_dates()
    }
}

impl TermStructure for PiecewiseYieldCurve {
    fn reference_date(&self) -> Date {
        self.curve.reference_date()
    }

    fn day_counter(&self) -> DayCounter {
        self.curve.day_counter()
    }

    fn calendar(&self) -> &Calendar {
        self.curve.calendar()
    }

    fn max_date(&self) -> Date {
        self.curve.max_date()
    }

    fn max_time(&self) -> Time {
        self.curve.max_time()
    }

    fn allows_extrapolation(&self) -> bool {
        self.curve.allows_extrapolation()
    }
}

impl YieldTermStructure for PiecewiseYieldCurve {
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        self.curve.discount_impl(t)
    }

    fn jump_factor(&self, t: Time) -> Result<Real> {
        self.curve.jump_factor(t)
    }

    fn forward_impl(&self, t: Time) -> Result<Rate> {
        self.curve.forward_impl(t)
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Options for a [`PiecewiseYieldCurve`] bootstrap.
#[derive(Debug, Clone)]
pub struct PiecewiseYieldCurveBuilder {
    reference_date: Date,
    day_counter: DayCounter,
    strategy: CurveStrategy,
    calendar: Calendar,
    jumps: Vec<QuoteHandle>,
    jump_dates: Vec<Date>,
    config: BootstrapConfig,
    extrapolate: bool,
}

impl PiecewiseYieldCurveBuilder {
    /// Calendar of the resulting curve.
    pub fn calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Discount jumps; year ends when `dates` is empty.
    pub fn jumps(mut self, quotes: Vec<QuoteHandle>, dates: Vec<Date>) -> Self {
        self.jumps = quotes;
        self.jump_dates = dates;
        self
    }

    /// Solver settings.
    pub fn config(mut self, config: BootstrapConfig) -> Self {
        self.config = config;
        self
    }

    /// Allow queries past the last pillar on the resulting curve.
    pub fn extrapolation(mut self, extrapolate: bool) -> Self {
        self.extrapolate = extrapolate;
        self
    }

    /// Run the bootstrap.
    ///
    /// # Errors
    /// * Configuration: no helpers, two helpers with the same pillar (both
    ///   are named), a pillar not after the reference date, or an external
    ///   curve that does not cover a helper;
    /// * Convergence: a node could not be bracketed or solved, or the
    ///   joint solve left a residual above `global_accuracy` after
    ///   `max_global_iterations`.
    ///
    /// Failures inside a helper are wrapped in [`Error::Helper`] with its
    /// description and pillar.
    pub fn build(self, mut helpers: Vec<Arc<dyn RateHelper>>) -> Result<PiecewiseYieldCurve> {
        ql_core::ensure!(!helpers.is_empty(), "no bootstrap helpers given");
        helpers.sort_by_key(|h| h.pillar_date());
        for pair in helpers.windows(2) {
            ql_core::ensure!(
                pair[0].pillar_date() != pair[1].pillar_date(),
                "more than one instrument with pillar {}: '{}' and '{}'",
                pair[0].pillar_date(),
                pair[0].description(),
                pair[1].description()
            );
        }
        for helper in &helpers {
            ql_core::ensure!(
                helper.pillar_date() > self.reference_date,
                "'{}' has pillar {} not after the reference date {}",
                helper.description(),
                helper.pillar_date(),
                self.reference_date
            );
            helper
                .check_curves()
                .map_err(|e| e.in_helper(helper.description(), helper.pillar_date()))?;
        }

        let mut dates = Vec::with_capacity(helpers.len() + 1);
        dates.push(self.reference_date);
        dates.extend(helpers.iter().map(|h| h.pillar_date()));
        let times: Vec<Time> = dates
            .iter()
            .map(|&d| self.day_counter.year_fraction(self.reference_date, d))
            .collect();
        for (w, d) in times.windows(2).zip(dates.windows(2)) {
            ql_core::ensure!(w[1] > w[0], "pillars {} and {} map to the same time", d[0], d[1]);
        }

        let jumps = Jumps::new(self.jumps, self.jump_dates, self.reference_date, self.day_counter)?;
        let mut base = TermStructureBase::new(self.reference_date, self.calendar, self.day_counter);
        base.extrapolate = true;
        let bootstrap = Bootstrap {
            base: &base,
            strategy: self.strategy,
            dates: &dates,
            times: &times,
            jumps: &jumps,
            config: &self.config,
            solver: Brent::with_max_evaluations(self.config.max_iterations),
        };
        let (data, global_iterations) = bootstrap.run(&helpers)?;

        base.extrapolate = self.extrapolate;
        let curve = InterpolatedYieldCurve::from_nodes(base, self.strategy, dates, times, data, jumps)?;
        Ok(PiecewiseYieldCurve {
            curve,
            helpers,
            global_iterations,
        })
    }
}

// ── Iterative bootstrap ───────────────────────────────────────────────────────

struct Bootstrap<'a> {
    base: &'a TermStructureBase,
    strategy: CurveStrategy,
    dates: &'a [Date],
    times: &'a [Time],
    jumps: &'a Jumps,
    config: &'a BootstrapConfig,
    solver: Brent,
}

impl Bootstrap<'_> {
    /// Solve every node; returns the node values and the number of joint
    /// iterations.
    fn run(&self, helpers: &[Arc<dyn RateHelper>]) -> Result<(Vec<Real>, usize)> {
        let traits = self.strategy.traits;
        let global = self.strategy.interpolator.is_global();
        let n = self.dates.len();
        let mut data = vec![0.0; n];
        data[0] = match traits {
            CurveTraits::Discount => 1.0,
            CurveTraits::ZeroYield | CurveTraits::ForwardRate => INITIAL_RATE_GUESS,
        };

        let pass = if global {
            CurveStrategy::new(traits, self.strategy.interpolator.fallback())
        } else {
            self.strategy
        };
        for i in 1..n {
            let helper = &*helpers[i - 1];
            let guess = self.seed(pass, &data, i).map_err(|e| self.wrap(e, helper))?;
            let value = self.solve_node(pass, helper, &mut data, i, guess)?;
            debug!(
                helper = %helper.description(),
                pillar = %helper.pillar_date(),
                value,
                strategy = %pass,
                "bootstrapped node"
            );
        }

        if !global {
            return Ok((data, 0));
        }
        self.solve_jointly(helpers, &data)
    }

    /// Least-squares solve of all nodes at once under the cubic scheme,
    /// starting from `seed`.
    fn solve_jointly(&self, helpers: &[Arc<dyn RateHelper>], seed: &[Real]) -> Result<(Vec<Real>, usize)> {
        let quotes = helpers
            .iter()
            .map(|h| h.quote().map_err(|e| self.wrap(e, &**h)))
            .collect::<Result<Vec<_>>>()?;
        let residuals = NodeResiduals {
            bootstrap: self,
            helpers,
            quotes,
        };
        let positive = self.strategy.traits == CurveTraits::Discount || self.strategy.interpolator.is_log();
        let constraint: &dyn Constraint = if positive { &PositiveConstraint } else { &NoConstraint };
        let end_criteria = EndCriteria {
            max_iterations: self.config.max_global_iterations,
            max_stationary_state_iterations: self.config.max_global_iterations,
            root_epsilon: self.config.accuracy * self.config.accuracy,
            function_epsilon: 0.0,
            gradient_norm_epsilon: 0.0,
        };
        let initial = Array::from_vec(seed[1..].to_vec());
        let result = LevenbergMarquardt::default().minimize(&residuals, constraint, &initial, &end_criteria)?;
        let max_residual = residuals.values(&result.x)?.amax();
        trace!(
            iterations = result.iterations,
            max_residual,
            end = ?result.end_type,
            strategy = %self.strategy,
            "joint bootstrap solve"
        );
        if max_residual <= self.config.global_accuracy {
            return Ok((residuals.nodes(&result.x), result.iterations));
        }
        warn!(
            max_global_iterations = self.config.max_global_iterations,
            max_residual,
            strategy = %self.strategy,
            "joint bootstrap solve did not reprice every helper"
        );
        Err(Error::Convergence {
            context: format!("bootstrap of {} curve", self.strategy),
            residual: max_residual,
            iterations: result.iterations,
        })
    }

    /// Curve over the first `len` nodes.
    fn trial_curve(&self, strategy: CurveStrategy, data: &[Real], len: usize) -> Result<InterpolatedYieldCurve> {
        InterpolatedYieldCurve::from_nodes(
            self.base.clone(),
            strategy,
            self.dates[..len].to_vec(),
            self.times[..len].to_vec(),
            data[..len].to_vec(),
            self.jumps.clone(),
        )
    }

    /// Initial value for node `i`: the last solved forward carried on.
    fn seed(&self, strategy: CurveStrategy, data: &[Real], i: usize) -> Result<Real> {
        let (t_prev, t) = (self.times[i - 1], self.times[i]);
        let forward = if i == 1 {
            INITIAL_RATE_GUESS
        } else {
            let curve = self.trial_curve(strategy, data, i)?;
            let t_before = self.times[i - 2];
            (curve.discount_impl(t_before)? / curve.discount_impl(t_prev)?).ln() / (t_prev - t_before)
        };
        Ok(strategy.traits.extend(data[i - 1], forward, t_prev, t))
    }

    /// Write a trial value for pillar `i` into the node data.
    fn assign(&self, strategy: CurveStrategy, data: &mut [Real], i: usize, x: Real) {
        data[i] = x;
        if strategy.is_lagged() {
            data[i - 1] = x;
        } else if i == 1 && strategy.traits != CurveTraits::Discount {
            // the node at t = 0 of rate curves follows the first node
            data[0] = x;
        }
    }

    /// Solve pillar `i` on a curve made of the first `i + 1` nodes.
    fn solve_node(
        &self,
        strategy: CurveStrategy,
        helper: &dyn RateHelper,
        data: &mut [Real],
        i: usize,
        guess: Real,
    ) -> Result<Real> {
        let value = self
            .bracket_and_solve(strategy, helper, data, i, guess)
            .map_err(|e| self.wrap(e, helper))?;
        self.assign(strategy, data, i, value);
        Ok(value)
    }

    fn bracket_and_solve(
        &self,
        strategy: CurveStrategy,
        helper: &dyn RateHelper,
        data: &mut [Real],
        i: usize,
        guess: Real,
    ) -> Result<Real> {
        let quote = helper.quote()?;
        let mut objective = |x: Real| -> Result<Real> {
            self.assign(strategy, data, i, x);
            let curve = self.trial_curve(strategy, data, i + 1)?;
            Ok(helper.implied_quote(&curve)? - quote)
        };

        let (t_prev, t) = (self.times[i - 1], self.times[i]);
        let mut width = INITIAL_BRACKET_WIDTH;
        let mut residual = Real::INFINITY;
        for _ in 0..=self.config.bracket_expansions {
            let (lo, hi) = strategy.bracket(guess, t_prev, t, width);
            let (f_lo, f_hi) = (objective(lo)?, objective(hi)?);
            if f_lo * f_hi <= 0.0 {
                return self.solver.solve_bracketed(&mut objective, self.config.accuracy, lo, hi);
            }
            residual = f_lo.abs().min(f_hi.abs());
            width *= 2.0;
        }
        Err(Error::Convergence {
            context: format!("bootstrap: no bracket around {guess} for node {i}"),
            residual,
            iterations: 2 * (self.config.bracket_expansions + 1),
        })
    }

    fn wrap(&self, error: Error, helper: &dyn RateHelper) -> Error {
        error.in_helper(helper.description(), helper.pillar_date())
    }
}

/// Quote residuals of every helper as a function of nodes `1..n`.
struct NodeResiduals<'a, 'b> {
    bootstrap: &'a Bootstrap<'b>,
    helpers: &'a [Arc<dyn RateHelper>],
    quotes: Vec<Real>,
}

impl NodeResiduals<'_, '_> {
    fn nodes(&self, x: &Array) -> Vec<Real> {
        let mut data = Vec::with_capacity(x.len() + 1);
        data.push(match self.bootstrap.strategy.traits {
            CurveTraits::Discount => 1.0,
            CurveTraits::ZeroYield | CurveTraits::ForwardRate => x[0],
        });
        data.extend(x.iter().copied());
        data
    }
}

impl CostFunction for NodeResiduals<'_, '_> {
    fn values(&self, x: &Array) -> Result<Array> {
        let data = self.nodes(x);
        let curve = self.bootstrap.trial_curve(self.bootstrap.strategy, &data, data.len())?;
        let mut residuals = Array::zeros(self.helpers.len());
        for (j, (helper, quote)) in self.helpers.iter().zip(&self.quotes).enumerate() {
            let implied = helper
                .implied_quote(&curve)
                .map_err(|e| self.bootstrap.wrap(e, &**helper))?;
            residuals[j] = implied - quote;
        }
        Ok(residuals)
    }
}
