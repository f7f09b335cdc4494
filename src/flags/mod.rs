pub mod client;

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::session::SessionUser;

/// Identity key used when a request carries no usable identity.
pub const ANONYMOUS_KEY: &str = "anonymous";

/// Value of the roles attribute for an identified session without roles.
pub const GUEST_ROLES: &str = "guest";

// Evaluation context the flag engine targets against, built once per request
// and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct EvalContext {
    pub key: String,
    pub display_name: Option<String>,
    pub attributes: HashMap<String, String>,
    pub is_anonymous: bool,
}

impl EvalContext {
    /// Build the context for an optional session. A session with a non-empty
    /// email becomes an identified context keyed by that email; anything else
    /// is the anonymous context. Missing session data is normal input here,
    /// not a failure.
    pub fn for_session(session: Option<&SessionUser>) -> Self {
        let identified = session.and_then(|user| {
            user.email
                .as_deref()
                .filter(|email| !email.is_empty())
                .map(|email| (email.to_string(), user))
        });

        match identified {
            Some((email, user)) => {
                let roles = if user.roles.is_empty() {
                    GUEST_ROLES.to_string()
                } else {
                    user.roles.join(",")
                };

                let mut attributes = HashMap::new();
                attributes.insert("roles".to_string(), roles);

                EvalContext {
                    key: email,
                    display_name: user.display_name.clone(),
                    attributes,
                    is_anonymous: false,
                }
            }
            None => EvalContext {
                key: ANONYMOUS_KEY.to_string(),
                display_name: None,
                attributes: HashMap::new(),
                is_anonymous: true,
            },
        }
    }
}

// Flag evaluation result
#[derive(Debug)]
pub struct FlagEvaluation {
    pub enabled: bool,
    pub reason: String,
}

// Flag data needed for evaluation
#[derive(Debug, Clone)]
pub struct FlagData {
    pub key: String,
    pub enabled: bool,
    pub rollout_percentage: i32,
}

// Targeting rule data
#[derive(Debug, Clone)]
pub struct RuleData {
    pub rule_type: String,
    pub rule_value: String,
    pub enabled: bool,
    pub priority: i32,
}

/// Outcome of one boolean flag evaluation. `value` is never absent: any
/// failure upstream degrades to the caller's default instead of erroring.
#[derive(Debug, Clone)]
pub struct FlagDecision {
    pub flag_key: String,
    pub context_key: String,
    pub value: bool,
    pub reason: String,
}

impl FlagDecision {
    pub fn fallback(flag_key: &str, context: &EvalContext, default: bool, why: &str) -> Self {
        Self {
            flag_key: flag_key.to_string(),
            context_key: context.key.clone(),
            value: default,
            reason: format!("default: {}", why),
        }
    }
}

/// Decide whether a flag is enabled for a given context
pub fn evaluate_flag(
    flag: &FlagData,
    rules: &[RuleData],
    context: &EvalContext,
) -> FlagEvaluation {
    // Step 1: If flag is globally disabled, return false
    if !flag.enabled {
        return FlagEvaluation {
            enabled: false,
            reason: "Flag is globally disabled".to_string(),
        };
    }

    // Step 2: Sort rules by priority (highest first) and check them
    let mut sorted_rules = rules.to_vec();
    sorted_rules.sort_by(|a, b| b.priority.cmp(&a.priority));

    for rule in sorted_rules.iter() {
        if !rule.enabled {
            continue; // Skip disabled rules
        }

        match rule.rule_type.as_str() {
            "user_key" => {
                if !context.is_anonymous && context.key == rule.rule_value {
                    return FlagEvaluation {
                        enabled: true,
                        reason: format!("Matched user_key rule: {}", rule.rule_value),
                    };
                }
            }
            "email_domain" => {
                // The context key is the email for identified users
                if !context.is_anonymous && context.key.ends_with(&rule.rule_value) {
                    return FlagEvaluation {
                        enabled: true,
                        reason: format!("Matched email_domain rule: {}", rule.rule_value),
                    };
                }
            }
            "role" => {
                let has_role = context
                    .attributes
                    .get("roles")
                    .map(|roles| roles.split(',').any(|r| r == rule.rule_value))
                    .unwrap_or(false);

                if has_role {
                    return FlagEvaluation {
                        enabled: true,
                        reason: format!("Matched role rule: {}", rule.rule_value),
                    };
                }
            }
            _ => {} // Unknown rule type, skip
        }
    }

    // Step 3: Check percentage rollout using consistent hashing
    if flag.rollout_percentage > 0 {
        if should_enable_for_percentage(&flag.key, &context.key, flag.rollout_percentage) {
            return FlagEvaluation {
                enabled: true,
                reason: format!("User in {}% rollout", flag.rollout_percentage),
            };
        } else {
            return FlagEvaluation {
                enabled: false,
                reason: format!("User not in {}% rollout", flag.rollout_percentage),
            };
        }
    }

    // Step 4: Default - flag is enabled globally but no rules matched and no rollout
    FlagEvaluation {
        enabled: true,
        reason: "Flag enabled globally, no specific rules applied".to_string(),
    }
}

/// Consistent hashing for percentage rollout: the same context always gets
/// the same result for a given percentage. Anonymous contexts share one
/// bucket by construction.
fn should_enable_for_percentage(flag_key: &str, context_key: &str, percentage: i32) -> bool {
    if percentage <= 0 {
        return false;
    }
    if percentage >= 100 {
        return true;
    }

    let mut hasher = DefaultHasher::new();
    format!("{}:{}", flag_key, context_key).hash(&mut hasher);
    let hash = hasher.finish();

    let bucket = (hash % 100) as i32;

    bucket < percentage
}
