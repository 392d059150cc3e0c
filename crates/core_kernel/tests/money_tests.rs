//! Unit tests for the Money module as used by service line pricing

use core_kernel::{Money, Currency, MoneyError};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::AED);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_from_minor_converts_fils() {
        let m = Money::from_minor(10050, Currency::AED);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_default_currency_is_aed() {
        assert_eq!(Currency::default(), Currency::AED);
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_times_zero_quantity_is_zero() {
        let unit = Money::new(dec!(250), Currency::AED);
        assert!(unit.times(0).unwrap().is_zero());
    }

    #[test]
    fn test_sum_rejects_mixed_currencies() {
        let amounts = [
            Money::new(dec!(1), Currency::AED),
            Money::new(dec!(1), Currency::USD),
        ];
        let result = Money::sum(Currency::AED, &amounts);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_sum_of_nothing_is_zero() {
        let total = Money::sum(Currency::AED, &Vec::<Money>::new()).unwrap();
        assert!(total.is_zero());
    }

    #[test]
    fn test_line_total_keeps_sub_fils_precision() {
        let unit = Money::new(dec!(33.3333), Currency::AED);
        assert_eq!(unit.times(3).unwrap().amount(), dec!(99.9999));
        assert_eq!(unit.times(3).unwrap().to_string(), "AED 100.00");
    }
}

mod predicates {
    use super::*;

    #[test]
    fn test_zero_is_neither_positive_nor_negative() {
        let m = Money::zero(Currency::AED);
        assert!(!m.is_positive());
        assert!(!m.is_negative());
    }
}
