//! Tests for portfolio and position input validation.

#[cfg(test)]
mod tests {
    use crate::portfolio::{NewPortfolio, NewPosition, Position, PositionUpdate};
    use crate::{Error, ValidationError};
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn new_position() -> NewPosition {
        NewPosition {
            symbol: "aapl".to_string(),
            shares: dec!(10),
            purchase_price: dec!(100),
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            notes: None,
        }
    }

    fn assert_invalid<T: std::fmt::Debug>(result: crate::Result<T>) {
        assert!(
            matches!(result, Err(Error::Validation(_))),
            "expected validation error, got {:?}",
            result
        );
    }

    // ==================== Portfolio ====================

    #[test]
    fn test_portfolio_name_bounds() {
        let ok = NewPortfolio {
            name: "Retirement".to_string(),
            description: None,
        };
        assert!(ok.validate().is_ok());

        let empty = NewPortfolio {
            name: "   ".to_string(),
            description: None,
        };
        assert_invalid(empty.validate());

        let long = NewPortfolio {
            name: "x".repeat(51),
            description: None,
        };
        assert_invalid(long.validate());

        let max = NewPortfolio {
            name: "x".repeat(50),
            description: Some("d".repeat(200)),
        };
        assert!(max.validate().is_ok());
    }

    #[test]
    fn test_portfolio_description_limit() {
        let input = NewPortfolio {
            name: "Growth".to_string(),
            description: Some("d".repeat(201)),
        };
        assert_invalid(input.validate());
    }

    // ==================== NewPosition ====================

    #[test]
    fn test_new_position_normalizes_symbol() {
        let validated = new_position().validated(today()).unwrap();
        assert_eq!(validated.symbol, "AAPL");
    }

    #[test]
    fn test_new_position_rejects_bad_symbol() {
        let input = NewPosition {
            symbol: "abcde1".to_string(),
            ..new_position()
        };
        assert!(matches!(
            input.validated(today()),
            Err(Error::Validation(ValidationError::InvalidSymbol(_)))
        ));
    }

    #[test]
    fn test_shares_must_be_positive() {
        assert_invalid(
            NewPosition {
                shares: dec!(0),
                ..new_position()
            }
            .validated(today()),
        );
        assert_invalid(
            NewPosition {
                shares: dec!(-1),
                ..new_position()
            }
            .validated(today()),
        );
        assert!(NewPosition {
            shares: dec!(0.0001),
            ..new_position()
        }
        .validated(today())
        .is_ok());
    }

    #[test]
    fn test_purchase_price_bounds() {
        assert_invalid(
            NewPosition {
                purchase_price: dec!(0),
                ..new_position()
            }
            .validated(today()),
        );
        assert_invalid(
            NewPosition {
                purchase_price: dec!(100000.01),
                ..new_position()
            }
            .validated(today()),
        );
        assert!(NewPosition {
            purchase_price: dec!(100000),
            ..new_position()
        }
        .validated(today())
        .is_ok());
    }

    #[test]
    fn test_purchase_date_window() {
        let future = NewPosition {
            purchase_date: NaiveDate::from_ymd_opt(2024, 6, 16).unwrap(),
            ..new_position()
        };
        assert_invalid(future.validated(today()));

        let too_old = NewPosition {
            purchase_date: NaiveDate::from_ymd_opt(1974, 6, 14).unwrap(),
            ..new_position()
        };
        assert_invalid(too_old.validated(today()));

        let oldest = NewPosition {
            purchase_date: NaiveDate::from_ymd_opt(1974, 6, 15).unwrap(),
            ..new_position()
        };
        assert!(oldest.validated(today()).is_ok());

        let same_day = NewPosition {
            purchase_date: today(),
            ..new_position()
        };
        assert!(same_day.validated(today()).is_ok());
    }

    #[test]
    fn test_notes_trimmed_and_limited() {
        let blank = NewPosition {
            notes: Some("   ".to_string()),
            ..new_position()
        };
        assert_eq!(blank.validated(today()).unwrap().notes, None);

        let long = NewPosition {
            notes: Some("n".repeat(501)),
            ..new_position()
        };
        assert_invalid(long.validated(today()));
    }

    // ==================== PositionUpdate ====================

    #[test]
    fn test_update_applies_only_given_fields() {
        let now = Utc::now().naive_utc();
        let mut position = Position {
            id: "pos-1".to_string(),
            portfolio_id: "pf-1".to_string(),
            symbol: "AAPL".to_string(),
            shares: dec!(10),
            purchase_price: dec!(100),
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            notes: Some("core holding".to_string()),
            created_at: now,
            updated_at: now,
        };

        let update = PositionUpdate {
            shares: Some(dec!(12)),
            ..Default::default()
        }
        .validated(today())
        .unwrap();
        update.apply_to(&mut position);

        assert_eq!(position.shares, dec!(12));
        assert_eq!(position.purchase_price, dec!(100));
        assert_eq!(position.notes.as_deref(), Some("core holding"));
    }

    #[test]
    fn test_update_with_blank_notes_clears_them() {
        let now = Utc::now().naive_utc();
        let mut position = Position {
            id: "pos-1".to_string(),
            portfolio_id: "pf-1".to_string(),
            symbol: "AAPL".to_string(),
            shares: dec!(10),
            purchase_price: dec!(100),
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            notes: Some("old".to_string()),
            created_at: now,
            updated_at: now,
        };

        let update = PositionUpdate {
            notes: Some("  ".to_string()),
            ..Default::default()
        }
        .validated(today())
        .unwrap();
        update.apply_to(&mut position);
        assert_eq!(position.notes, None);
    }

    #[test]
    fn test_update_validates_fields() {
        let update = PositionUpdate {
            purchase_price: Some(dec!(-5)),
            ..Default::default()
        };
        assert_invalid(update.validated(today()));
        assert!(PositionUpdate::default().is_empty());
    }
}
