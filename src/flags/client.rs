use sqlx::PgPool;
use uuid::Uuid;

use super::{evaluate_flag, EvalContext, FlagData, FlagDecision, RuleData};

// Row types for the flag store lookups
#[derive(Debug, sqlx::FromRow)]
struct FlagRow {
    id: Uuid,
    key: String,
    enabled: bool,
    rollout_percentage: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct RuleRow {
    rule_type: String,
    rule_value: String,
    enabled: bool,
    priority: i32,
}

/// Client for the flag store. Injected through `AppState` so every request
/// path receives it explicitly.
#[derive(Clone)]
pub struct FlagClient {
    pool: PgPool,
}

impl FlagClient {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Evaluate a boolean flag against a context. Any failure to reach or
    /// read the flag store degrades to `default`: callers always get a
    /// decision, never an error.
    pub async fn bool_variation(
        &self,
        flag_key: &str,
        context: &EvalContext,
        default: bool,
    ) -> FlagDecision {
        let flag: Option<FlagRow> = match sqlx::query_as(
            r#"
            SELECT id, key, enabled, rollout_percentage
            FROM feature_flags
            WHERE key = $1
            "#,
        )
        .bind(flag_key)
        .fetch_optional(&self.pool)
        .await
        {
            Ok(row) => row,
            Err(e) => {
                eprintln!("Failed to fetch flag {}: {:?}", flag_key, e);
                return FlagDecision::fallback(flag_key, context, default, "flag store unreachable");
            }
        };

        let flag = match flag {
            Some(f) => f,
            None => return FlagDecision::fallback(flag_key, context, default, "flag not found"),
        };

        let rules: Vec<RuleRow> = match sqlx::query_as(
            r#"
            SELECT rule_type, rule_value, enabled, priority
            FROM flag_rules
            WHERE flag_id = $1
            ORDER BY priority DESC
            "#,
        )
        .bind(flag.id)
        .fetch_all(&self.pool)
        .await
        {
            Ok(rows) => rows,
            Err(e) => {
                eprintln!("Failed to fetch rules for flag {}: {:?}", flag_key, e);
                return FlagDecision::fallback(flag_key, context, default, "flag store unreachable");
            }
        };

        let flag_data = FlagData {
            key: flag.key,
            enabled: flag.enabled,
            rollout_percentage: flag.rollout_percentage,
        };
        let rule_data: Vec<RuleData> = rules
            .into_iter()
            .map(|r| RuleData {
                rule_type: r.rule_type,
                rule_value: r.rule_value,
                enabled: r.enabled,
                priority: r.priority,
            })
            .collect();

        let evaluation = evaluate_flag(&flag_data, &rule_data, context);

        self.record_evaluation(flag.id, context.key.clone(), evaluation.enabled);

        FlagDecision {
            flag_key: flag_key.to_string(),
            context_key: context.key.clone(),
            value: evaluation.enabled,
            reason: evaluation.reason,
        }
    }

    // Evaluation analytics are fire-and-forget: spawned so they can never
    // block or fail the request that triggered them.
    fn record_evaluation(&self, flag_id: Uuid, user_identifier: String, result: bool) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            let _ = sqlx::query(
                r#"
                INSERT INTO flag_evaluations (id, flag_id, user_identifier, result)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(flag_id)
            .bind(user_identifier)
            .bind(result)
            .execute(&pool)
            .await;
        });
    }
}
