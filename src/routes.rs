use crate::{
    api::{attendance, employee, events, leave_request, org, project, storage, task, ticket},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Every wrap site builds its own limiter, so counters are per route
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(build_limiter(config.rate_login_per_min))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(build_limiter(config.rate_register_per_min))
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(build_limiter(config.rate_refresh_per_min))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(build_limiter(config.rate_login_per_min))
                    .route(web::post().to(handlers::logout)),
            )
            // session and guard answer unauthenticated callers with a null
            // session / a login redirect, so they sit outside the API scope
            .service(web::resource("/session").route(web::get().to(handlers::session)))
            .service(web::resource("/guard").route(web::get().to(handlers::guard)))
            .service(
                web::resource("/password/reset")
                    .wrap(build_limiter(config.rate_register_per_min))
                    .route(web::post().to(handlers::request_password_reset)),
            )
            .service(
                web::resource("/password/update")
                    .wrap(build_limiter(config.rate_register_per_min))
                    .route(web::post().to(handlers::update_password)),
            ),
    );

    // Public object bytes, like a BaaS public bucket
    cfg.service(
        web::scope("/files")
            .service(web::resource("/{bucket}/{key}").route(web::get().to(storage::serve))),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(build_limiter(config.rate_protected_per_min)) // rate limiting
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("").route(web::get().to(attendance::attendance_list)),
                    )
                    // /attendance/today
                    .service(web::resource("/today").route(web::get().to(attendance::today)))
                    // /attendance/punch
                    .service(web::resource("/punch").route(web::post().to(attendance::punch)))
                    // /attendance/summary
                    .service(web::resource("/summary").route(web::get().to(attendance::summary))),
            )
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(web::resource("/departments").route(web::get().to(org::list_departments)))
            .service(web::resource("/job-titles").route(web::get().to(org::list_job_titles)))
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/balance must register before /leave/{id} so
                    // "balance" is never read as an id
                    .service(
                        web::resource("/balance")
                            .route(web::get().to(leave_request::leave_balance)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::scope("/projects")
                    // /projects
                    .service(
                        web::resource("")
                            .route(web::post().to(project::create_project))
                            .route(web::get().to(project::list_projects)),
                    )
                    // /projects/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(project::get_project))
                            .route(web::put().to(project::update_project))
                            .route(web::delete().to(project::delete_project)),
                    ),
            )
            .service(
                web::scope("/tasks")
                    // /tasks
                    .service(
                        web::resource("")
                            .route(web::post().to(task::create_task))
                            .route(web::get().to(task::list_tasks)),
                    )
                    // /tasks/{id}
                    .service(web::resource("/{id}").route(web::get().to(task::get_task)))
                    // /tasks/{id}/assign
                    .service(
                        web::resource("/{id}/assign").route(web::put().to(task::assign_task)),
                    )
                    // /tasks/{id}/status
                    .service(
                        web::resource("/{id}/status").route(web::put().to(task::task_status)),
                    ),
            )
            .service(
                web::scope("/tickets")
                    // /tickets
                    .service(
                        web::resource("")
                            .route(web::post().to(ticket::create_ticket))
                            .route(web::get().to(ticket::list_tickets)),
                    )
                    // /tickets/{id}
                    .service(web::resource("/{id}").route(web::get().to(ticket::get_ticket)))
                    // /tickets/{id}/status
                    .service(
                        web::resource("/{id}/status").route(web::put().to(ticket::ticket_status)),
                    ),
            )
            .service(web::resource("/files").route(web::post().to(storage::upload)))
            .service(web::resource("/events").route(web::get().to(events::stream))),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days, jti stored)
//
// API REQUEST
//  └─ Authorization: Bearer access_token
//
// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ rotates the jti, returns new token pair
