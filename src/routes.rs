use crate::{
    api::{leave_request, people, progress_report, task},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Helper to build a per-scope limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("non-zero period and burst size");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/me").route(web::get().to(people::get_me)))
            .service(
                web::scope("/people")
                    // /people
                    .service(web::resource("").route(web::get().to(people::list_people)))
                    // /people/{id}
                    .service(web::resource("/{id}").route(web::get().to(people::get_person)))
                    // /people/{id}/approval-chain
                    .service(
                        web::resource("/{id}/approval-chain")
                            .route(web::get().to(people::approval_chain)),
                    )
                    // /people/{id}/role
                    .service(
                        web::resource("/{id}/role").route(web::put().to(people::update_role)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/pending (registered before /{id})
                    .service(
                        web::resource("/pending").route(web::get().to(leave_request::pending_leave)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/manager-decision
                    .service(
                        web::resource("/{id}/manager-decision")
                            .route(web::put().to(leave_request::manager_decision)),
                    )
                    // /leave/{id}/director-decision
                    .service(
                        web::resource("/{id}/director-decision")
                            .route(web::put().to(leave_request::director_decision)),
                    ),
            )
            .service(
                web::scope("/reports")
                    // /reports
                    .service(
                        web::resource("")
                            .route(web::get().to(progress_report::list_reports))
                            .route(web::post().to(progress_report::submit_report)),
                    ),
            )
            .service(
                web::scope("/tasks")
                    // /tasks
                    .service(
                        web::resource("")
                            .route(web::get().to(task::list_tasks))
                            .route(web::post().to(task::create_task)),
                    )
                    // /tasks/{id}/status
                    .service(
                        web::resource("/{id}/status").route(web::put().to(task::update_task_status)),
                    ),
            ),
    );
}

// API REQUEST
//  └─ Authorization: Bearer access_token (issued by the identity provider)
//       └─ auth_middleware → AuthUser → directory snapshot → access scope

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_builds_for_any_rate() {
        build_limiter(0);
        build_limiter(1);
        build_limiter(1000);
        build_limiter(120_000);
    }
}
