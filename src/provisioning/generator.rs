//! Batch proposal provisioning.
//!
//! Builds one script that creates `count` proposals and registers each on the
//! dashboard. Each register step reads the proposal reference from the slot
//! bound by its paired create step, since that reference only exists once the
//! create step has executed.

use super::script::{Arg, MoveTarget, Script, ScriptBuilder, Slot, Step};
use super::{ProvisionError, ProvisionResult};
use crate::clock::Clock;
use crate::ledger::ObjectRef;
use chrono::{DateTime, Datelike, Days, Months, Utc};
use rand::Rng;

pub const PROPOSAL_MODULE: &str = "proposal";
pub const CREATE_FUNCTION: &str = "create";
pub const DASHBOARD_MODULE: &str = "dashboard";
pub const REGISTER_FUNCTION: &str = "register_proposal";

/// Upper bound of the title discriminator, scaled by iteration.
const DISCRIMINATOR_SCALE: u64 = 100_000;

/// Offset added per iteration so expirations never collide.
const EXPIRATION_STEP_MS: u64 = 1_000;

/// Generator inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorParams {
    pub package: ObjectRef,
    pub admin_cap: ObjectRef,
    pub dashboard: ObjectRef,
    pub count: i64,
}

impl GeneratorParams {
    /// Validate raw references.
    pub fn parse(
        package: &str,
        admin_cap: &str,
        dashboard: &str,
        count: i64,
    ) -> ProvisionResult<Self> {
        Ok(Self {
            package: ObjectRef::parse(package)?,
            admin_cap: ObjectRef::parse(admin_cap)?,
            dashboard: ObjectRef::parse(dashboard)?,
            count,
        })
    }
}

/// Expiration for batch iteration `i` (1-based): one calendar year after
/// `now`, plus `i` seconds.
///
/// A Feb 29 start rolls forward to Mar 1 of the following year, so the
/// deadline is never less than a full year away.
pub fn expiration_for(now: DateTime<Utc>, i: u64) -> ProvisionResult<u64> {
    let one_year = now
        .with_year(now.year() + 1)
        .or_else(|| {
            now.checked_add_months(Months::new(12))
                .and_then(|feb_28| feb_28.checked_add_days(Days::new(1)))
        })
        .ok_or_else(|| ProvisionError::InvalidArgument(format!("clock out of range: {}", now)))?;

    let base = u64::try_from(one_year.timestamp_millis()).map_err(|_| {
        ProvisionError::InvalidArgument(format!("clock before Unix epoch: {}", now))
    })?;

    i.checked_mul(EXPIRATION_STEP_MS)
        .and_then(|offset| base.checked_add(offset))
        .ok_or_else(|| ProvisionError::InvalidArgument(format!("iteration {} overflows", i)))
}

/// Generate the provisioning script.
///
/// `count < 0` is rejected; `count == 0` yields an empty script. The clock is
/// read once for the whole batch.
pub fn generate<C, R>(params: &GeneratorParams, clock: &C, rng: &mut R) -> ProvisionResult<Script>
where
    C: Clock + ?Sized,
    R: Rng + ?Sized,
{
    let count = u64::try_from(params.count).map_err(|_| {
        ProvisionError::InvalidArgument(format!(
            "proposal count must not be negative (got {})",
            params.count
        ))
    })?;

    let now = clock.now();
    let create_target = MoveTarget::new(&params.package, PROPOSAL_MODULE, CREATE_FUNCTION);
    let register_target = MoveTarget::new(&params.package, DASHBOARD_MODULE, REGISTER_FUNCTION);

    let mut builder = ScriptBuilder::new();
    for i in 1..=count {
        let expiration = expiration_for(now, i)?;
        let discriminator = discriminator(rng, i)?;
        let slot = Slot::for_proposal(i);

        builder.push(
            Step::call(
                create_target.clone(),
                vec![
                    Arg::Object(params.admin_cap.clone()),
                    Arg::Str(format!("Proposal {}", discriminator)),
                    Arg::Str(format!("Proposal description {}", discriminator)),
                    Arg::U64(expiration),
                ],
            )
            .assign(slot.clone()),
        );

        builder.push(Step::call(
            register_target.clone(),
            vec![
                Arg::Object(params.dashboard.clone()),
                Arg::Object(params.admin_cap.clone()),
                Arg::Slot(slot),
            ],
        ));
    }

    let script = builder.build()?;
    tracing::info!(
        count,
        steps = script.len(),
        package = %params.package,
        "generated provisioning script"
    );
    Ok(script)
}

/// Cosmetic label number. Not unique; the ledger assigns the real identifier.
fn discriminator<R: Rng + ?Sized>(rng: &mut R, i: u64) -> ProvisionResult<u64> {
    let upper = DISCRIMINATOR_SCALE
        .checked_mul(i)
        .ok_or_else(|| ProvisionError::InvalidArgument(format!("iteration {} overflows", i)))?;
    Ok(rng.gen_range(0..upper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const PACKAGE: &str = "0x12a35086460b7474372b60f9df3d557e9f4a8fa961b3b516aa34e438c83fd893";
    const ADMIN_CAP: &str = "0xeee1d86010bb0610c487a59c1cfd28afa33beffa808c4e8b1d814453e0f562e8";
    const DASHBOARD: &str = "0xd789ccb38840ef790626e175809db193b8c99ed15edce90b32e2d9e035581ef4";

    fn params(count: i64) -> GeneratorParams {
        GeneratorParams::parse(PACKAGE, ADMIN_CAP, DASHBOARD, count).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_zero_count_is_empty() {
        let script = generate(&params(0), &clock(), &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(script.is_empty());
    }

    #[test]
    fn test_negative_count_rejected() {
        let err = generate(&params(-1), &clock(), &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidArgument(_)));
    }

    #[test]
    fn test_malformed_reference_rejected() {
        let err = GeneratorParams::parse("package", ADMIN_CAP, DASHBOARD, 1).unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidArgument(_)));
    }

    #[test]
    fn test_pairs_create_then_register() {
        let script = generate(&params(3), &clock(), &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(script.len(), 6);

        for (pair, steps) in script.steps().chunks(2).enumerate() {
            let (create, register) = (&steps[0], &steps[1]);
            assert_eq!(create.target.module, PROPOSAL_MODULE);
            assert_eq!(create.target.function, CREATE_FUNCTION);
            assert_eq!(register.target.module, DASHBOARD_MODULE);
            assert_eq!(register.target.function, REGISTER_FUNCTION);

            let expected = Slot::for_proposal(pair as u64 + 1);
            assert_eq!(create.produces(), Some(&expected));
            assert_eq!(register.args.last(), Some(&Arg::Slot(expected)));
        }
    }

    #[test]
    fn test_expirations_one_year_plus_offset() {
        let script = generate(&params(2), &clock(), &mut StdRng::seed_from_u64(7)).unwrap();
        let next_year = Utc
            .with_ymd_and_hms(2027, 10, 18, 12, 0, 0)
            .unwrap()
            .timestamp_millis() as u64;

        let expirations: Vec<u64> = script
            .steps()
            .iter()
            .step_by(2)
            .filter_map(|step| match step.args.last() {
                Some(Arg::U64(ms)) => Some(*ms),
                _ => None,
            })
            .collect();

        assert_eq!(expirations, vec![next_year + 1_000, next_year + 2_000]);
    }

    #[test]
    fn test_leap_day_rolls_to_march() {
        let leap = Utc.with_ymd_and_hms(2028, 2, 29, 0, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2029, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(
            expiration_for(leap, 1).unwrap(),
            expected.timestamp_millis() as u64 + 1_000
        );
    }

    #[test]
    fn test_leap_day_deadline_is_over_a_year_away() {
        let leap = Utc.with_ymd_and_hms(2028, 2, 29, 9, 30, 0).unwrap();
        let days_365 = leap.timestamp_millis() as u64 + 365 * 86_400_000;
        assert!(expiration_for(leap, 1).unwrap() > days_365);
    }

    #[test]
    fn test_titles_use_scaled_discriminator() {
        let script = generate(&params(4), &clock(), &mut StdRng::seed_from_u64(99)).unwrap();

        for (pair, steps) in script.steps().chunks(2).enumerate() {
            let i = pair as u64 + 1;
            let Arg::Str(title) = &steps[0].args[1] else {
                panic!("title must be a string literal");
            };
            let n: u64 = title.strip_prefix("Proposal ").unwrap().parse().unwrap();
            assert!(n < DISCRIMINATOR_SCALE * i);
            assert_eq!(steps[0].args[2], Arg::Str(format!("Proposal description {}", n)));
        }
    }

    #[test]
    fn test_rendered_script_shape() {
        let rendered = generate(&params(1), &clock(), &mut StdRng::seed_from_u64(3))
            .unwrap()
            .render();

        assert!(rendered.starts_with("sui client ptb"));
        assert!(rendered.contains(&format!("--move-call {}::proposal::create", PACKAGE)));
        assert!(rendered.contains(&format!("@{}", ADMIN_CAP)));
        assert!(rendered.contains("--assign proposal_id_1"));
        assert!(rendered.ends_with(&format!("@{} @{} proposal_id_1", DASHBOARD, ADMIN_CAP)));
    }
}
