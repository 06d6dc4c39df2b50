mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::{RecordingDriver, default_config, mock_factory};
use sql_replica_middleware::prelude::*;
use tokio::runtime::Runtime;

fn mock_connection(driver: &Arc<RecordingDriver>) -> Result<Connection, SqlMiddlewareDbError> {
    mock_factory(Arc::clone(driver)).new_instance("mock", default_config().params())
}

#[test]
fn connect_opens_once() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let driver = Arc::new(RecordingDriver::default());
        let conn = mock_connection(&driver)?;
        assert!(!conn.is_connected());
        assert!(driver.opened().is_empty());

        let (a, b) = tokio::join!(conn.connect(), conn.connect());
        a?;
        b?;
        conn.connect().await?;

        assert!(conn.is_connected());
        assert_eq!(
            driver.opened(),
            vec!["mysql:host=default.example.com;dbname=test".to_string()]
        );
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

#[test]
fn failed_connect_is_retried() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let driver = Arc::new(RecordingDriver::default());
        driver.fail_opens.store(1, Ordering::SeqCst);
        let conn = mock_connection(&driver)?;

        let err = conn.connect().await.map(|_| ()).unwrap_err();
        assert!(matches!(err, SqlMiddlewareDbError::ConnectionError(_)));
        assert!(!conn.is_connected());

        conn.connect().await?;
        assert_eq!(driver.opened().len(), 1);
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

#[test]
fn insert_quotes_columns_and_binds_by_name() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let driver = Arc::new(RecordingDriver::default());
        let conn = mock_connection(&driver)?;

        let data = BindData::from([
            ("name".to_string(), RowValues::from("Bob")),
            ("age".to_string(), RowValues::Int(40)),
        ]);
        assert_eq!(conn.insert("users", &data).await?, 1);

        let executed = driver.executed();
        assert_eq!(
            executed[0].0,
            "INSERT INTO `users` (`name`, `age`) VALUES (:name, :age)"
        );
        assert_eq!(
            executed[0].1,
            vec![
                ("name".to_string(), RowValues::Text("Bob".into())),
                ("age".to_string(), RowValues::Int(40)),
            ]
        );
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

#[test]
fn update_renders_where_clause_from_conditions() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let driver = Arc::new(RecordingDriver::default());
        let conn = mock_connection(&driver)?;

        let data = BindData::from([("name".to_string(), RowValues::from("O'Neil"))]);
        conn.update(
            "users",
            &data,
            &[
                Condition::bound("users.id = ?", 5),
                Condition::literal("users.active = 1"),
            ],
        )
        .await?;

        let executed = driver.executed();
        assert_eq!(
            executed[0].0,
            "UPDATE `users` SET `name` = :name WHERE `users`.`id` = 5 AND `users`.`active` = 1"
        );
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

#[test]
fn update_without_conditions_touches_every_row() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let driver = Arc::new(RecordingDriver::default());
        let conn = mock_connection(&driver)?;

        let data = BindData::from([("flag".to_string(), RowValues::Bool(true))]);
        conn.update("users", &data, &[]).await?;
        assert_eq!(driver.executed()[0].0, "UPDATE `users` SET `flag` = :flag");
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

#[test]
fn empty_dml_arguments_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let driver = Arc::new(RecordingDriver::default());
        let conn = mock_connection(&driver)?;

        let err = conn.delete("users", &[]).await.unwrap_err();
        assert!(matches!(err, SqlMiddlewareDbError::ParameterError(_)));
        let err = conn.insert("users", &BindData::new()).await.unwrap_err();
        assert!(matches!(err, SqlMiddlewareDbError::ParameterError(_)));
        let err = conn
            .update("users", &BindData::new(), &[Condition::literal("1 = 1")])
            .await
            .unwrap_err();
        assert!(matches!(err, SqlMiddlewareDbError::ParameterError(_)));

        assert!(driver.executed().is_empty());
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

#[test]
fn delete_quotes_bound_lists() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let driver = Arc::new(RecordingDriver::default());
        let conn = mock_connection(&driver)?;

        conn.delete("users", &[Condition::bound("users.id IN (?)", vec![1, 2, 3])])
            .await?;
        assert_eq!(
            driver.executed()[0].0,
            "DELETE FROM `users` WHERE `users`.`id` IN (1, 2, 3)"
        );
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

#[test]
fn repeated_placeholders_get_numbered_slots() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let driver = Arc::new(RecordingDriver::default());
        let conn = mock_connection(&driver)?;

        let data = BindData::from([
            ("name".to_string(), RowValues::from("x")),
            ("unused".to_string(), RowValues::Int(1)),
        ]);
        conn.query("SELECT * FROM t WHERE a = :name OR b = :name OR c = :other", &data)
            .await?;

        let slots: Vec<String> = driver.executed()[0]
            .1
            .iter()
            .map(|(slot, _)| slot.clone())
            .collect();
        assert_eq!(slots, vec!["name", "name2"]);
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

#[test]
fn builders_are_paged_by_dialect() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let driver = Arc::new(RecordingDriver::default());
        let conn = mock_connection(&driver)?;

        conn.query(
            SimpleSelect::new("SELECT * FROM t").with_limit(10).with_offset(20),
            &BindData::new(),
        )
        .await?;
        conn.fetch_value(SimpleSelect::new("SELECT id FROM t").with_limit(50), &BindData::new())
            .await?;
        // text is never rewritten
        conn.fetch_one("SELECT id FROM t", &BindData::new()).await?;

        let sql: Vec<String> = driver.executed().into_iter().map(|(s, _)| s).collect();
        assert_eq!(
            sql,
            vec![
                "SELECT * FROM t\nLIMIT 10\nOFFSET 20".to_string(),
                "SELECT id FROM t\nLIMIT 1".to_string(),
                "SELECT id FROM t".to_string(),
            ]
        );
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

#[test]
fn offset_fetch_dialect_renders_rows_clauses() {
    let factory = ConnectionFactory::empty().with_adapter(
        "denali",
        Dialect::SqlsrvDenali,
        Arc::new(RecordingDriver::default()),
    );
    let conn = factory
        .new_instance("denali", ConnectionParams::default())
        .expect("adapter is registered");

    let spec = QuerySpec::from(SimpleSelect::new("SELECT * FROM t ORDER BY id").with_limit(5));
    assert_eq!(
        conn.render(&spec),
        "SELECT * FROM t ORDER BY id\nOFFSET 0 ROWS\nFETCH NEXT 5 ROWS ONLY"
    );
    assert_eq!(conn.quote_name("dbo.users u"), "[dbo].[users] [u]");
}

#[test]
fn quote_into_uses_driver_quoting() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let driver = Arc::new(RecordingDriver::default());
        let conn = mock_connection(&driver)?;

        assert_eq!(conn.quote("it's").await?, "'it''s'");
        assert_eq!(conn.quote(vec![1, 2]).await?, "1, 2");
        assert_eq!(
            conn.quote_into("a = ? AND b = ?", vec![RowValues::Int(1), RowValues::Null])
                .await?,
            "a = 1 AND b = NULL"
        );
        let err = conn
            .quote_into("a = ? AND b = ? AND c = ?", vec![1, 2])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SqlMiddlewareDbError::NotEnoughValues {
                placeholders: 3,
                values: 2
            }
        ));
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

#[test]
fn signals_observe_connect_and_query() -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl ConnectionSignal for Recorder {
        fn pre_connect(&self, _conn: &Connection) {
            self.0.lock().unwrap().push("pre_connect".into());
        }
        fn post_connect(&self, _conn: &Connection) {
            self.0.lock().unwrap().push("post_connect".into());
        }
        fn pre_query(&self, _conn: &Connection, sql: &str, _data: &BindData) {
            self.0.lock().unwrap().push(format!("pre_query {sql}"));
        }
        fn post_query(&self, _conn: &Connection, stmt: &dyn DriverStatement) {
            self.0
                .lock()
                .unwrap()
                .push(format!("post_query {}", stmt.row_count()));
        }
    }

    let rt = Runtime::new()?;
    rt.block_on(async {
        let recorder = Arc::new(Recorder::default());
        let factory = mock_factory(Arc::new(RecordingDriver::default()))
            .with_signal(Arc::clone(&recorder) as Arc<dyn ConnectionSignal>);
        let conn = factory.new_instance("mock", default_config().params())?;

        conn.query("SELECT 1", &BindData::new()).await?;
        conn.query("SELECT 2", &BindData::new()).await?;

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![
                "pre_connect",
                "post_connect",
                "pre_query SELECT 1",
                "post_query 1",
                "pre_query SELECT 2",
                "post_query 1",
            ]
        );
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

#[test]
fn pool_roles_display() {
    let roles = [
        ConnectionRole::Default,
        ConnectionRole::Master("a".into()),
        ConnectionRole::Slave("b".into()),
    ];
    let shown: Vec<String> = roles.iter().map(ToString::to_string).collect();
    assert_eq!(shown, vec!["default", "master:a", "slave:b"]);
}

#[test]
fn multiline_values_keep_later_values_intact() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let driver = Arc::new(RecordingDriver::default());
        let conn = mock_connection(&driver)?;

        conn.delete(
            "t",
            &[
                Condition::bound("note = ?", "a\nb"),
                Condition::bound("code = ?", "x.y"),
                Condition::bound("t.k = ?", "v"),
            ],
        )
        .await?;
        assert_eq!(
            driver.executed()[0].0,
            "DELETE FROM `t` WHERE note = 'a\nb' AND code = 'x.y' AND `t`.`k` = 'v'"
        );
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}
