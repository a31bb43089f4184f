use fundest::core::config::AppConfig;
use fundest::core::refresh::FundOutcome;
use fundest::core::valuation::Basis;
use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn row(code: &str, name: &str, weight: &str) -> String {
        format!(
            "<tr><td>1</td><td><a href='http://quote.eastmoney.com/{code}.html'>{code}</a></td>\
             <td class='tol'>{name}</td><td class='xglj'>股吧 行情</td>\
             <td class='tor'>{weight}</td><td class='tor'>100.00</td><td class='tor'>2,000.00</td></tr>"
        )
    }

    /// A disclosure payload wrapping a single quarter table.
    pub fn disclosure(title: &str, rows: &[(&str, &str, &str)]) -> String {
        let rows: String = rows
            .iter()
            .map(|(code, name, weight)| row(code, name, weight))
            .collect();
        let html = format!(
            "<a title='{title}'>{title}</a><div><h4><label>2024年4季度股票投资明细</label>\
             <label>截止至：2024-12-31</label></h4><table><tbody>{rows}</tbody></table></div>"
        );
        let escaped = html.replace('"', "\\\"").replace('/', "\\/");
        format!("var apidata={{ content:\"{escaped}\",arryear:[2024],curyear:2024}};")
    }

    /// A full-layout quote line carrying `change` in the percent change field.
    pub fn quote(variable: &str, change: &str) -> String {
        let mut fields: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        fields[32] = change.to_string();
        format!("v_{variable}=\"{}\";\n", fields.join("~"))
    }

    pub async fn create_holdings_server(funds: &[(&str, String)]) -> MockServer {
        let mock_server = MockServer::start().await;
        for (fund_id, body) in funds {
            Mock::given(method("GET"))
                .and(path("/FundArchivesDatas.aspx"))
                .and(query_param("code", *fund_id))
                .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
                .mount(&mock_server)
                .await;
        }
        mock_server
    }

    pub async fn create_quote_server(body: String) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex("^/q="))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.into_bytes()))
            .mount(&mock_server)
            .await;
        mock_server
    }
}

fn write_config(dir: &tempfile::TempDir, funds: &[&str], eastmoney: &str, tencent: &str) -> String {
    let config_path = dir.path().join("config.yaml");
    let funds: String = funds.iter().map(|f| format!("  - \"{f}\"\n")).collect();
    let config_content = format!(
        "funds:\n{funds}providers:\n  eastmoney:\n    base_url: {eastmoney}\n  tencent:\n    base_url: {tencent}\n\
         fund_delay_ms: 0\ndata_path: {}\n",
        dir.path().join("data").display()
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");
    config_path.to_string_lossy().into_owned()
}

#[test_log::test(tokio::test)]
async fn test_full_cycle_with_mock_upstreams() {
    let holdings_server = test_utils::create_holdings_server(&[
        (
            "000001",
            test_utils::disclosure(
                "某白酒主题混合",
                &[("600519", "贵州茅台", "6.00%"), ("000858", "五粮液", "4.00%")],
            ),
        ),
        (
            "000002",
            test_utils::disclosure("华夏沪深300ETF联接A", &[]),
        ),
        ("000003", "<html>blocked</html>".to_string()),
    ])
    .await;
    let quote_server = test_utils::create_quote_server(format!(
        "{}{}{}",
        test_utils::quote("sh600519", "2.00"),
        test_utils::quote("sz000858", "-1.00"),
        test_utils::quote("sh000300", "1.50"),
    ))
    .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = write_config(
        &temp_dir,
        &["000001", "000002", "000003"],
        &holdings_server.uri(),
        &quote_server.uri(),
    );
    let config = AppConfig::load_from_path(&config_path).unwrap();

    let orchestrator = fundest::cli::estimate::build_orchestrator(&config).unwrap();
    let report = orchestrator.run_cycle(config.funds.ids(), &|| {}).await;
    info!(?report, "Cycle finished");

    assert_eq!(report.funds.len(), 3);
    match &report.funds[0] {
        FundOutcome::Valued { valuation, .. } => {
            assert_eq!(valuation.basis, Basis::HoldingsWeighted);
            assert!((valuation.estimate - 0.8).abs() < 1e-9);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    match &report.funds[1] {
        FundOutcome::Valued { record, valuation } => {
            assert!(record.is_feeder);
            assert_eq!(record.tracked_index.as_deref(), Some("沪深300"));
            assert_eq!(valuation.basis, Basis::IndexProxy);
            assert!((valuation.estimate - 1.5).abs() < 1e-9);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(matches!(report.funds[2], FundOutcome::Failed { .. }));
    assert_eq!(report.requested_symbols, 3);
    assert!(report.missing_symbols.is_empty());
    drop(orchestrator);

    let result = fundest::run_command(fundest::AppCommand::Estimate, Some(config_path.as_str())).await;
    assert!(result.is_ok(), "Estimate failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_watchlist_commands_update_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = write_config(
        &temp_dir,
        &["011102"],
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
    );

    fundest::run_command(fundest::AppCommand::Add("161725".to_string()), Some(config_path.as_str()))
        .await
        .unwrap();
    fundest::run_command(fundest::AppCommand::Remove("011102".to_string()), Some(config_path.as_str()))
        .await
        .unwrap();
    fundest::run_command(fundest::AppCommand::List, Some(config_path.as_str()))
        .await
        .unwrap();

    let config = AppConfig::load_from_path(&config_path).unwrap();
    assert_eq!(config.funds.ids(), ["161725"]);
    assert_eq!(config.fund_delay_ms, 0);
}

#[test_log::test(tokio::test)]
async fn test_missing_config_is_an_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("absent.yaml");
    let result =
        fundest::run_command(fundest::AppCommand::Estimate, Some(missing.to_str().unwrap())).await;
    assert!(result.is_err());
}
