//! Fee & tax calculator properties

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use stocktax::error::CalcError;
    use stocktax::fees::{calculate, FeeSchedule, CGT_RATE};
    use stocktax::types::{TradeInput, TradeType};

    /// Prices with two decimal places, as quoted on the exchange
    fn price() -> impl Strategy<Value = Decimal> {
        (0i64..=10_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    fn quantity() -> impl Strategy<Value = Decimal> {
        (1i64..=100_000).prop_map(Decimal::from)
    }

    fn trade_type() -> impl Strategy<Value = TradeType> {
        prop_oneof![Just(TradeType::Buy), Just(TradeType::Sell)]
    }

    // ============================================================================
    // Laws
    // ============================================================================

    proptest! {
        #[test]
        fn gross_is_exact_product(q in quantity(), p in price()) {
            let fees = calculate(TradeType::Buy, q, p, None).unwrap();
            prop_assert_eq!(fees.gross, q * p);
        }

        #[test]
        fn net_identity_holds(
            t in trade_type(),
            q in quantity(),
            p in price(),
            bp in proptest::option::of(price()),
        ) {
            let fees = calculate(t, q, p, bp).unwrap();
            prop_assert_eq!(
                fees.net,
                fees.gross
                    - fees.broker_commission
                    - fees.regulatory_fee
                    - fees.depository_charge
                    - fees.capital_gains_tax
            );
        }

        #[test]
        fn buys_are_never_taxed(q in quantity(), p in price(), bp in proptest::option::of(price())) {
            let fees = calculate(TradeType::Buy, q, p, bp).unwrap();
            prop_assert_eq!(fees.capital_gains_tax, Decimal::ZERO);
        }

        #[test]
        fn sell_at_or_below_cost_is_not_taxed(q in quantity(), p in price(), extra in price()) {
            let buy_price = p + extra;
            let fees = calculate(TradeType::Sell, q, p, Some(buy_price)).unwrap();
            prop_assert_eq!(fees.capital_gains_tax, Decimal::ZERO);
        }

        #[test]
        fn sell_above_cost_is_taxed_on_profit(
            q in quantity(),
            bp in (1i64..=5_000_000).prop_map(|c| Decimal::new(c, 2)),
            gain in (1i64..=5_000_000).prop_map(|c| Decimal::new(c, 2)),
        ) {
            let p = bp + gain;
            let fees = calculate(TradeType::Sell, q, p, Some(bp)).unwrap();
            prop_assert_eq!(fees.capital_gains_tax, (p - bp) * q * CGT_RATE);
        }

        #[test]
        fn calculation_is_idempotent(
            t in trade_type(),
            q in quantity(),
            p in price(),
            bp in proptest::option::of(price()),
        ) {
            let schedule = FeeSchedule::default();
            let input = TradeInput::new(t, q, p, bp);
            prop_assert_eq!(schedule.calculate(&input), schedule.calculate(&input));
        }

        #[test]
        fn huge_inputs_fail_cleanly(
            t in trade_type(),
            q in any::<u64>().prop_map(Decimal::from),
            p in any::<i64>().prop_map(|cents| Decimal::new(cents, 2)),
            bp in proptest::option::of(any::<i64>().prop_map(|cents| Decimal::new(cents, 2))),
        ) {
            match calculate(t, q, p, bp) {
                Ok(fees) => prop_assert_eq!(fees.net, fees.gross - fees.total_deductions()),
                Err(err) => prop_assert!(matches!(err, CalcError::Overflow { .. }), "expected Overflow, got {:?}", err),
            }
        }
    }

    // ============================================================================
    // Reference examples
    // ============================================================================

    #[test]
    fn reference_buy() {
        let fees = FeeSchedule::default()
            .calculate_raw(TradeType::Buy, "10", "100", None)
            .unwrap()
            .rounded();
        assert_eq!(fees.gross, dec!(1000.00));
        assert_eq!(fees.broker_commission, dec!(3.60));
        assert_eq!(fees.regulatory_fee, dec!(0.15));
        assert_eq!(fees.depository_charge, dec!(25.00));
        assert_eq!(fees.capital_gains_tax, dec!(0.00));
        assert_eq!(fees.net, dec!(971.25));
    }

    #[test]
    fn reference_sell_with_profit() {
        let fees = FeeSchedule::default()
            .calculate_raw(TradeType::Sell, "10", "120", Some("100"))
            .unwrap();
        assert_eq!(fees.gross, dec!(1200.00));
        assert_eq!(fees.broker_commission, dec!(4.32));
        assert_eq!(fees.regulatory_fee, dec!(0.18));
        assert_eq!(fees.depository_charge, dec!(25.00));
        assert_eq!(fees.capital_gains_tax, dec!(15.00));
        assert_eq!(fees.net, dec!(1155.50));
    }

    #[test]
    fn reference_sell_with_loss() {
        let fees = FeeSchedule::default()
            .calculate_raw(TradeType::Sell, "5", "90", Some("100"))
            .unwrap();
        assert_eq!(fees.capital_gains_tax, dec!(0.00));
    }

    #[test]
    fn quantity_beyond_decimal_range_is_rejected() {
        let err = FeeSchedule::default()
            .calculate_raw(TradeType::Buy, "79228162514264337593543950335", "10", None)
            .unwrap_err();
        assert_eq!(err, CalcError::Overflow { amount: "gross" });
    }

    #[test]
    fn negative_inputs_pass_through_unvalidated() {
        // Range checks belong to the ledger; the calculator only parses.
        let fees = FeeSchedule::default()
            .calculate_raw(TradeType::Sell, "-2", "50", Some("-10"))
            .unwrap();
        assert_eq!(fees.gross, dec!(-100));
        // (50 - -10) * -2 = -120, a loss, so no tax
        assert_eq!(fees.capital_gains_tax, Decimal::ZERO);
    }
}
