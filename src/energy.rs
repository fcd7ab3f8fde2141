//! Energy targets
//!
//! Daily expenditure uses the Mifflin-St Jeor BMR scaled by an activity factor
//! and a goal multiplier. The per-meal target either splits what is left of
//! today's budget or, when nothing was logged yet, takes the slot's default
//! share of the whole day.

use crate::types::{ActivityLevel, Demographics, Goal, IntakeEntry, MealSlot, Sex, UserContext};
use serde::{Deserialize, Serialize};

/// Energy figures for one meal request (kcal)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyTarget {
    pub bmr: f64,
    pub tdee: f64,
    /// Calories left today, present only when intake was logged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<f64>,
    pub meal_slot: MealSlot,
    pub meal_target: f64,
}

/// Calculator for daily and per-meal energy targets
pub struct EnergyCalculator;

impl EnergyCalculator {
    /// Compute all energy figures for the user's current meal slot
    pub fn compute(user: &UserContext) -> EnergyTarget {
        let bmr = basal_metabolic_rate(&user.demographics);
        let tdee = total_daily_energy_expenditure(&user.demographics, user.activity_level, user.goal);
        let slot = user.current_context.meal_slot;
        let intake = &user.current_context.today_intake;

        let remaining = (!intake.is_empty()).then(|| remaining_calories_today(tdee, intake));
        let meal_target = meal_calorie_target(tdee, slot, intake);

        EnergyTarget {
            bmr,
            tdee,
            remaining,
            meal_slot: slot,
            meal_target,
        }
    }
}

/// Mifflin-St Jeor basal metabolic rate
pub fn basal_metabolic_rate(demographics: &Demographics) -> f64 {
    let base = 10.0 * demographics.weight_kg + 6.25 * demographics.height_cm
        - 5.0 * f64::from(demographics.age);
    let bmr = match demographics.sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    };
    non_negative(bmr)
}

/// Total daily energy expenditure including activity and goal adjustment
pub fn total_daily_energy_expenditure(
    demographics: &Demographics,
    activity: ActivityLevel,
    goal: Goal,
) -> f64 {
    non_negative(basal_metabolic_rate(demographics) * activity.factor() * goal.multiplier())
}

/// Calories still available today. Skipped meals do not count and unknown
/// calories count as zero.
pub fn remaining_calories_today(tdee: f64, intake: &[IntakeEntry]) -> f64 {
    let eaten: f64 = intake
        .iter()
        .filter(|entry| !entry.is_skipped())
        .filter_map(|entry| entry.calories)
        .filter(|calories| calories.is_finite())
        .sum();
    non_negative(tdee - eaten)
}

/// Calorie target for one meal slot
pub fn meal_calorie_target(tdee: f64, slot: MealSlot, intake: &[IntakeEntry]) -> f64 {
    if intake.is_empty() {
        return non_negative(tdee * slot.default_ratio());
    }

    let remaining = remaining_calories_today(tdee, intake);
    let share = match slot {
        MealSlot::Breakfast => 0.25,
        MealSlot::Lunch | MealSlot::Brunch => 0.55,
        MealSlot::Dinner => 1.0,
        other => other.default_ratio(),
    };
    non_negative(remaining * share)
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CurrentContext, DietProfile};

    fn demographics(sex: Sex, weight_kg: f64) -> Demographics {
        Demographics {
            sex,
            age: 30,
            height_cm: 180.0,
            weight_kg,
            nationality: None,
        }
    }

    fn intake(calories: f64, status: Option<&str>) -> IntakeEntry {
        IntakeEntry {
            calories: Some(calories),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn test_bmr_by_sex() {
        // 10*80 + 6.25*180 - 5*30 = 1775
        assert!((basal_metabolic_rate(&demographics(Sex::Male, 80.0)) - 1780.0).abs() < 1e-9);
        assert!((basal_metabolic_rate(&demographics(Sex::Female, 80.0)) - 1614.0).abs() < 1e-9);
    }

    #[test]
    fn test_tdee_monotonic_in_weight_and_activity() {
        let light = total_daily_energy_expenditure(
            &demographics(Sex::Male, 70.0),
            ActivityLevel::Light,
            Goal::Maintenance,
        );
        let heavier = total_daily_energy_expenditure(
            &demographics(Sex::Male, 90.0),
            ActivityLevel::Light,
            Goal::Maintenance,
        );
        let more_active = total_daily_energy_expenditure(
            &demographics(Sex::Male, 70.0),
            ActivityLevel::High,
            Goal::Maintenance,
        );

        assert!(heavier > light);
        assert!(more_active > light);
    }

    #[test]
    fn test_goal_multipliers() {
        let demo = demographics(Sex::Female, 60.0);
        let maintenance =
            total_daily_energy_expenditure(&demo, ActivityLevel::Moderate, Goal::Maintenance);
        let cutting = total_daily_energy_expenditure(&demo, ActivityLevel::Moderate, Goal::Cutting);
        let bulking = total_daily_energy_expenditure(&demo, ActivityLevel::Moderate, Goal::Bulking);

        assert!((cutting - 0.85 * maintenance).abs() < 1e-9);
        assert!((bulking - 1.12 * maintenance).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_target_without_intake() {
        let target = meal_calorie_target(2000.0, MealSlot::Lunch, &[]);
        assert!((target - 700.0).abs() < 1e-9);

        let snack = meal_calorie_target(2000.0, MealSlot::Snack, &[]);
        assert!((snack - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_remaining_ignores_skipped_meals() {
        let logged = vec![intake(500.0, Some("eaten")), intake(400.0, Some("skipped"))];
        assert!((remaining_calories_today(2000.0, &logged) - 1500.0).abs() < 1e-9);

        let lunch = meal_calorie_target(2000.0, MealSlot::Lunch, &logged);
        assert!((lunch - 1500.0 * 0.55).abs() < 1e-9);

        let dinner = meal_calorie_target(2000.0, MealSlot::Dinner, &logged);
        assert!((dinner - 1500.0).abs() < 1e-9);

        let snack = meal_calorie_target(2000.0, MealSlot::Snack, &logged);
        assert!((snack - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_target_never_negative() {
        let overeaten = vec![intake(5000.0, None)];
        assert_eq!(remaining_calories_today(2000.0, &overeaten), 0.0);
        assert_eq!(meal_calorie_target(2000.0, MealSlot::Dinner, &overeaten), 0.0);

        let unknown = vec![IntakeEntry::default()];
        assert!((remaining_calories_today(2000.0, &unknown) - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_compute_for_user() {
        let user = UserContext {
            demographics: demographics(Sex::Male, 80.0),
            activity_level: ActivityLevel::Sedentary,
            goal: Goal::Maintenance,
            diet_profile: DietProfile::default(),
            current_context: CurrentContext {
                meal_slot: MealSlot::Breakfast,
                today_intake: vec![],
            },
            history: vec![],
        };

        let target = EnergyCalculator::compute(&user);
        assert!((target.tdee - 1780.0 * 1.2).abs() < 1e-9);
        assert!(target.remaining.is_none());
        assert!((target.meal_target - 1780.0 * 1.2 * 0.25).abs() < 1e-9);
    }
}
