//! Isolation and lifecycle tests across threads and tasks.

#[cfg(test)]
mod tests {
    use crate::context::{CommandContext, JobExecutorContext};
    use crate::engine::DefinitionInfoCacheObject;
    use crate::errors::{ContextError, StackKind};
    use crate::registry::ContextRegistry;
    use crate::testing::{init_test_tracing, mock_configuration, CountingDefinitionInfoCache};
    use serde_json::json;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_threads_see_only_their_own_stack() {
        init_test_tracing();
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = ["thread-a", "thread-b"]
            .into_iter()
            .map(|name| {
                let barrier = barrier.clone();
                thread::spawn(move || {
                    ContextRegistry::with_thread_local(|registry| {
                        registry.push_command(CommandContext::new(name));
                    });
                    // Both threads have pushed before either reads.
                    barrier.wait();
                    let seen = ContextRegistry::with_thread_local(|registry| {
                        let seen = registry.command_context().map(|c| c.command_name.clone());
                        let depth = registry.leak_report().command_depth;
                        registry.pop_command().unwrap();
                        (seen, depth)
                    });
                    barrier.wait();
                    seen
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results[0], (Some("thread-a".to_string()), 1));
        assert_eq!(results[1], (Some("thread-b".to_string()), 1));
    }

    #[test]
    fn test_fresh_thread_has_no_active_contexts() {
        let (active, current) = thread::spawn(|| {
            ContextRegistry::with_thread_local(|registry| {
                let active = registry.is_execution_active() || registry.is_command_active();
                (active, registry.execution_context().is_none())
            })
        })
        .join()
        .unwrap();

        assert!(!active);
        assert!(current);
    }

    #[test]
    fn test_configuration_push_pop_scenario() {
        thread::spawn(|| {
            ContextRegistry::with_thread_local(|registry| {
                let cache = Arc::new(CountingDefinitionInfoCache::new());
                registry.push_configuration(mock_configuration("C1", cache.clone()));
                registry.push_configuration(mock_configuration("C2", cache));

                registry.pop_configuration().unwrap();
                assert_eq!(registry.configuration().unwrap().name(), "C1");

                registry.pop_configuration().unwrap();
                assert!(registry.configuration().is_none());

                assert_eq!(
                    registry.pop_configuration().unwrap_err(),
                    ContextError::underflow(StackKind::EngineConfiguration)
                );
            });
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_pooled_thread_reset_between_units_of_work() {
        init_test_tracing();
        thread::spawn(|| {
            // First unit of work forgets to pop.
            ContextRegistry::with_thread_local(|registry| {
                registry.push_command(CommandContext::new("leaky"));
                registry.set_job_executor_context(JobExecutorContext::new().with_current_job("j1"));
            });

            let report = ContextRegistry::with_thread_local(ContextRegistry::reset);
            assert_eq!(report.command_depth, 1);
            assert!(report.job_executor_set);

            // Second unit of work starts clean.
            ContextRegistry::with_thread_local(|registry| {
                assert!(registry.command_context().is_none());
                assert!(registry.job_executor_context().is_none());
            });
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_memoized_resolution_on_thread_registry() {
        thread::spawn(|| {
            let cache = Arc::new(CountingDefinitionInfoCache::new().with_object(
                DefinitionInfoCacheObject::new("pd1").with_info_node(json!({
                    "bpmn": {
                        "elem1": { "name": "First" },
                        "elem2": { "name": "Second" }
                    }
                })),
            ));

            ContextRegistry::with_thread_local(|registry| {
                let _config = registry.enter_configuration(mock_configuration("C1", cache.clone()));
                let _command = registry.enter_command(CommandContext::new("cmd"));

                let first = registry.override_element_properties("elem1", "pd1").unwrap();
                let again = registry.override_element_properties("elem1", "pd1").unwrap();
                let other = registry.override_element_properties("elem2", "pd1").unwrap();

                assert_eq!(first, again);
                assert_eq!(other, Some(json!({ "name": "Second" })));
                assert_eq!(cache.lookups("pd1"), 1);
            });

            // Command scope exit drained the cache.
            ContextRegistry::with_thread_local(|registry| {
                assert!(registry.override_map().is_empty());
                assert!(registry.leak_report().is_clean());
            });
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_task_local_absent_outside_scope() {
        assert!(ContextRegistry::with_task_local(|_| ()).is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_tasks_see_only_their_own_registry() {
        let tasks: Vec<_> = ["task-a", "task-b"]
            .into_iter()
            .map(|name| {
                tokio::spawn(ContextRegistry::task_scope(ContextRegistry::new(), async move {
                    ContextRegistry::with_task_local(|registry| {
                        registry.push_command(CommandContext::new(name));
                    });
                    tokio::task::yield_now().await;
                    ContextRegistry::with_task_local(|registry| {
                        let seen = registry.command_context().map(|c| c.command_name.clone());
                        registry.pop_command().unwrap();
                        (seen, registry.is_command_active())
                    })
                }))
            })
            .collect();

        let mut results = Vec::new();
        for task in tasks {
            results.push(task.await.unwrap());
        }

        assert_eq!(results[0], Some((Some("task-a".to_string()), false)));
        assert_eq!(results[1], Some((Some("task-b".to_string()), false)));
    }
}
