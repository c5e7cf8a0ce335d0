#[cfg(test)]
mod tests {
    use crate::errors::{DatabaseError, Error, Result};
    use crate::events::{DomainEvent, MockDomainEventSink};
    use crate::portfolio::{
        NewPortfolio, NewPosition, Portfolio, PortfolioRepositoryTrait, PortfolioService,
        PortfolioServiceTrait, PortfolioUpdate, Position, PositionUpdate,
    };
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use finboard_market_data::{
        ChartRange, HistoricalBar, MarketDataError, MarketDataProvider, Quote,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    // --- In-memory repository ---

    #[derive(Default)]
    struct InMemoryPortfolioRepository {
        portfolios: Mutex<HashMap<String, Portfolio>>,
        next_id: AtomicUsize,
    }

    impl InMemoryPortfolioRepository {
        fn next_id(&self, prefix: &str) -> String {
            format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
        }
    }

    #[async_trait]
    impl PortfolioRepositoryTrait for InMemoryPortfolioRepository {
        fn list_by_user(&self, user_id: &str) -> Result<Vec<Portfolio>> {
            let mut list: Vec<Portfolio> = self
                .portfolios
                .lock()
                .unwrap()
                .values()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect();
            list.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(list)
        }

        fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio> {
            self.portfolios
                .lock()
                .unwrap()
                .get(portfolio_id)
                .cloned()
                .ok_or_else(|| DatabaseError::NotFound(portfolio_id.to_string()).into())
        }

        async fn create(&self, user_id: &str, new_portfolio: NewPortfolio) -> Result<Portfolio> {
            let now = Utc::now().naive_utc();
            let portfolio = Portfolio {
                id: self.next_id("pf"),
                name: new_portfolio.name,
                description: new_portfolio.description,
                user_id: user_id.to_string(),
                positions: vec![],
                created_at: now,
                updated_at: now,
            };
            self.portfolios
                .lock()
                .unwrap()
                .insert(portfolio.id.clone(), portfolio.clone());
            Ok(portfolio)
        }

        async fn update(&self, portfolio_id: &str, update: PortfolioUpdate) -> Result<Portfolio> {
            let mut map = self.portfolios.lock().unwrap();
            let portfolio = map
                .get_mut(portfolio_id)
                .ok_or_else(|| Error::from(DatabaseError::NotFound(portfolio_id.to_string())))?;
            portfolio.name = update.name;
            portfolio.description = update.description;
            Ok(portfolio.clone())
        }

        async fn delete(&self, portfolio_id: &str) -> Result<usize> {
            Ok(self.portfolios.lock().unwrap().remove(portfolio_id).map_or(0, |_| 1))
        }

        fn get_position(&self, position_id: &str) -> Result<Position> {
            self.portfolios
                .lock()
                .unwrap()
                .values()
                .flat_map(|p| p.positions.iter())
                .find(|p| p.id == position_id)
                .cloned()
                .ok_or_else(|| DatabaseError::NotFound(position_id.to_string()).into())
        }

        async fn insert_position(&self, portfolio_id: &str, new_position: NewPosition) -> Result<Position> {
            let now = Utc::now().naive_utc();
            let position = Position {
                id: self.next_id("pos"),
                portfolio_id: portfolio_id.to_string(),
                symbol: new_position.symbol,
                shares: new_position.shares,
                purchase_price: new_position.purchase_price,
                purchase_date: new_position.purchase_date,
                notes: new_position.notes,
                created_at: now,
                updated_at: now,
            };
            let mut map = self.portfolios.lock().unwrap();
            let portfolio = map
                .get_mut(portfolio_id)
                .ok_or_else(|| Error::from(DatabaseError::ForeignKeyViolation(portfolio_id.to_string())))?;
            portfolio.positions.push(position.clone());
            Ok(position)
        }

        async fn save_position(&self, position: Position) -> Result<Position> {
            let mut map = self.portfolios.lock().unwrap();
            let portfolio = map
                .get_mut(&position.portfolio_id)
                .ok_or_else(|| Error::from(DatabaseError::NotFound(position.id.clone())))?;
            let slot = portfolio
                .positions
                .iter_mut()
                .find(|p| p.id == position.id)
                .ok_or_else(|| Error::from(DatabaseError::NotFound(position.id.clone())))?;
            *slot = position.clone();
            Ok(position)
        }

        async fn delete_position(&self, position_id: &str) -> Result<usize> {
            let mut map = self.portfolios.lock().unwrap();
            for portfolio in map.values_mut() {
                let before = portfolio.positions.len();
                portfolio.positions.retain(|p| p.id != position_id);
                if portfolio.positions.len() != before {
                    return Ok(1);
                }
            }
            Ok(0)
        }
    }

    // --- Scripted market data ---

    #[derive(Default)]
    struct ScriptedProvider {
        quotes: HashMap<String, Quote>,
        fail: bool,
        batch_calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn with_quote(mut self, symbol: &str, price: Decimal, change: Decimal, change_percent: Decimal) -> Self {
            self.quotes.insert(
                symbol.to_string(),
                Quote::new(symbol, price, change, change_percent, Utc::now()),
            );
            self
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for ScriptedProvider {
        fn id(&self) -> &'static str {
            "SCRIPTED"
        }

        async fn get_quote(&self, symbol: &str) -> std::result::Result<Quote, MarketDataError> {
            self.quotes
                .get(symbol)
                .cloned()
                .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))
        }

        async fn get_quotes(&self, symbols: &[String]) -> std::result::Result<Vec<Quote>, MarketDataError> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(MarketDataError::Timeout {
                    provider: "SCRIPTED".to_string(),
                });
            }
            Ok(symbols.iter().filter_map(|s| self.quotes.get(s).cloned()).collect())
        }

        async fn get_history(
            &self,
            _symbol: &str,
            _range: ChartRange,
        ) -> std::result::Result<Vec<HistoricalBar>, MarketDataError> {
            Err(MarketDataError::NoDataForRange)
        }
    }

    struct Fixture {
        service: PortfolioService,
        provider: Arc<ScriptedProvider>,
        sink: MockDomainEventSink,
    }

    fn fixture(provider: ScriptedProvider) -> Fixture {
        let provider = Arc::new(provider);
        let sink = MockDomainEventSink::new();
        let service = PortfolioService::new(
            Arc::new(InMemoryPortfolioRepository::default()),
            provider.clone(),
            Arc::new(sink.clone()),
        );
        Fixture {
            service,
            provider,
            sink,
        }
    }

    fn new_position(symbol: &str, shares: Decimal, price: Decimal) -> NewPosition {
        NewPosition {
            symbol: symbol.to_string(),
            shares,
            purchase_price: price,
            purchase_date: Utc::now().date_naive() - Duration::days(30),
            notes: None,
        }
    }

    async fn create(service: &PortfolioService, user_id: &str, name: &str) -> Portfolio {
        service
            .create_portfolio(
                user_id,
                NewPortfolio {
                    name: name.to_string(),
                    description: None,
                },
            )
            .await
            .unwrap()
    }

    // ==================== CRUD & ownership ====================

    #[tokio::test]
    async fn test_create_trims_and_emits_event() {
        let fx = fixture(ScriptedProvider::default());
        let portfolio = create(&fx.service, "u1", "  Growth  ").await;

        assert_eq!(portfolio.name, "Growth");
        assert_eq!(fx.sink.events(), vec![DomainEvent::portfolio_changed("u1", &portfolio.id)]);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_name() {
        let fx = fixture(ScriptedProvider::default());
        let result = fx
            .service
            .create_portfolio(
                "u1",
                NewPortfolio {
                    name: "".to_string(),
                    description: None,
                },
            )
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(fx.sink.is_empty());
    }

    #[tokio::test]
    async fn test_other_user_cannot_read_or_mutate() {
        let fx = fixture(ScriptedProvider::default());
        let portfolio = create(&fx.service, "owner", "Mine").await;

        assert!(matches!(
            fx.service.get_portfolio("intruder", &portfolio.id),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            fx.service.delete_portfolio("intruder", &portfolio.id).await,
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            fx.service
                .add_position("intruder", &portfolio.id, new_position("AAPL", dec!(1), dec!(1)))
                .await,
            Err(Error::PermissionDenied(_))
        ));
        assert!(fx.service.get_portfolio("owner", &portfolio.id).is_ok());
    }

    #[tokio::test]
    async fn test_list_only_returns_own_portfolios() {
        let fx = fixture(ScriptedProvider::default());
        create(&fx.service, "u1", "A").await;
        create(&fx.service, "u1", "B").await;
        create(&fx.service, "u2", "C").await;

        assert_eq!(fx.service.list_portfolios("u1").unwrap().len(), 2);
        assert_eq!(fx.service.list_portfolios("u2").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let fx = fixture(ScriptedProvider::default());
        let portfolio = create(&fx.service, "u1", "Old").await;

        let updated = fx
            .service
            .update_portfolio(
                "u1",
                &portfolio.id,
                PortfolioUpdate {
                    name: "New".to_string(),
                    description: Some("long term".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "New");

        fx.service.delete_portfolio("u1", &portfolio.id).await.unwrap();
        assert!(matches!(
            fx.service.get_portfolio("u1", &portfolio.id),
            Err(Error::Database(DatabaseError::NotFound(_)))
        ));
    }

    // ==================== Positions ====================

    #[tokio::test]
    async fn test_add_position_normalizes_symbol() {
        let fx = fixture(ScriptedProvider::default());
        let portfolio = create(&fx.service, "u1", "Main").await;

        let position = fx
            .service
            .add_position("u1", &portfolio.id, new_position("aapl", dec!(10), dec!(100)))
            .await
            .unwrap();
        assert_eq!(position.symbol, "AAPL");
    }

    #[tokio::test]
    async fn test_add_position_rejects_invalid_input() {
        let fx = fixture(ScriptedProvider::default());
        let portfolio = create(&fx.service, "u1", "Main").await;

        let result = fx
            .service
            .add_position("u1", &portfolio.id, new_position("AAPL", dec!(0), dec!(100)))
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_position_in_wrong_portfolio_is_not_found() {
        let fx = fixture(ScriptedProvider::default());
        let first = create(&fx.service, "u1", "First").await;
        let second = create(&fx.service, "u1", "Second").await;
        let position = fx
            .service
            .add_position("u1", &first.id, new_position("AAPL", dec!(1), dec!(10)))
            .await
            .unwrap();

        let result = fx
            .service
            .update_position(
                "u1",
                &second.id,
                &position.id,
                PositionUpdate {
                    shares: Some(dec!(2)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_and_remove_position() {
        let fx = fixture(ScriptedProvider::default());
        let portfolio = create(&fx.service, "u1", "Main").await;
        let position = fx
            .service
            .add_position("u1", &portfolio.id, new_position("MSFT", dec!(5), dec!(300)))
            .await
            .unwrap();

        let updated = fx
            .service
            .update_position(
                "u1",
                &portfolio.id,
                &position.id,
                PositionUpdate {
                    shares: Some(dec!(7)),
                    notes: Some("added on dip".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.shares, dec!(7));
        assert_eq!(updated.purchase_price, dec!(300));
        assert_eq!(updated.notes.as_deref(), Some("added on dip"));

        fx.service
            .remove_position("u1", &portfolio.id, &position.id)
            .await
            .unwrap();
        assert!(fx.service.get_portfolio("u1", &portfolio.id).unwrap().positions.is_empty());
    }

    // ==================== Valuation ====================

    #[tokio::test]
    async fn test_metrics_with_live_quotes() {
        let fx = fixture(
            ScriptedProvider::default()
                .with_quote("AAPL", dec!(120), dec!(2), dec!(1.69))
                .with_quote("MSFT", dec!(30), dec!(0), dec!(0)),
        );
        let portfolio = create(&fx.service, "u1", "Main").await;
        fx.service
            .add_position("u1", &portfolio.id, new_position("AAPL", dec!(10), dec!(100)))
            .await
            .unwrap();
        fx.service
            .add_position("u1", &portfolio.id, new_position("MSFT", dec!(10), dec!(50)))
            .await
            .unwrap();

        let metrics = fx.service.get_portfolio_metrics("u1", &portfolio.id).await.unwrap();
        assert_eq!(metrics.total_value, dec!(1500));
        assert_eq!(metrics.total_cost_basis, dec!(1500));
        assert_eq!(metrics.total_gain_loss_percent, Decimal::ZERO);
        assert_eq!(metrics.day_change, dec!(20));
        assert_eq!(metrics.positions_with_market_data, 2);
        assert_eq!(fx.provider.batch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_metrics_degrade_when_provider_fails() {
        let fx = fixture(ScriptedProvider::failing());
        let portfolio = create(&fx.service, "u1", "Main").await;
        fx.service
            .add_position("u1", &portfolio.id, new_position("AAPL", dec!(10), dec!(100)))
            .await
            .unwrap();

        let metrics = fx.service.get_portfolio_metrics("u1", &portfolio.id).await.unwrap();
        assert_eq!(metrics.total_value, dec!(1000));
        assert_eq!(metrics.total_gain_loss, Decimal::ZERO);
        assert_eq!(metrics.missing_quotes, vec!["AAPL".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_portfolio_skips_quote_lookup() {
        let fx = fixture(ScriptedProvider::default());
        let portfolio = create(&fx.service, "u1", "Empty").await;

        let metrics = fx.service.get_portfolio_metrics("u1", &portfolio.id).await.unwrap();
        assert_eq!(metrics.total_value, Decimal::ZERO);
        assert!(metrics.positions.is_empty());
        assert_eq!(fx.provider.batch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_allocation_sorted_by_value() {
        let fx = fixture(
            ScriptedProvider::default()
                .with_quote("AAPL", dec!(25), dec!(0), dec!(0))
                .with_quote("MSFT", dec!(75), dec!(0), dec!(0)),
        );
        let portfolio = create(&fx.service, "u1", "Main").await;
        fx.service
            .add_position("u1", &portfolio.id, new_position("AAPL", dec!(10), dec!(20)))
            .await
            .unwrap();
        fx.service
            .add_position("u1", &portfolio.id, new_position("MSFT", dec!(10), dec!(70)))
            .await
            .unwrap();

        let slices = fx
            .service
            .get_portfolio_allocation("u1", &portfolio.id)
            .await
            .unwrap();
        assert_eq!(slices[0].symbol, "MSFT");
        assert_eq!(slices[0].percentage, dec!(75));
        assert_eq!(slices[1].percentage, dec!(25));
    }

    #[tokio::test]
    async fn test_dashboard_summary_uses_one_batch() {
        let fx = fixture(
            ScriptedProvider::default()
                .with_quote("AAPL", dec!(110), dec!(1), dec!(0.92))
                .with_quote("MSFT", dec!(210), dec!(2), dec!(0.96)),
        );
        let first = create(&fx.service, "u1", "First").await;
        let second = create(&fx.service, "u1", "Second").await;
        fx.service
            .add_position("u1", &first.id, new_position("AAPL", dec!(10), dec!(100)))
            .await
            .unwrap();
        fx.service
            .add_position("u1", &second.id, new_position("MSFT", dec!(5), dec!(200)))
            .await
            .unwrap();
        fx.service
            .add_position("u1", &second.id, new_position("AAPL", dec!(1), dec!(100)))
            .await
            .unwrap();

        let summary = fx.service.get_dashboard_summary("u1").await.unwrap();
        assert_eq!(summary.portfolio_count, 2);
        assert_eq!(summary.position_count, 3);
        assert_eq!(summary.total_value, dec!(1100) + dec!(1050) + dec!(110));
        assert_eq!(fx.provider.batch_calls.load(Ordering::SeqCst), 1);
    }
}
