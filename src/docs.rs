use crate::api::attendance::{
    AttendanceFilter, AttendanceListResponse, PunchResponse, SummaryQuery, SummaryResponse,
    TodayResponse,
};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::leave_request::{
    CreateLeave, LeaveBalanceEntry, LeaveBalanceResponse, LeaveFilter, LeaveListResponse,
    LeaveResponse, LeaveType,
};
use crate::api::project::{CreateProject, ProjectFilter, ProjectListResponse};
use crate::api::storage::{UploadRequest, UploadResponse};
use crate::api::task::{AssignTask, CreateTask, MoveTask, TaskFilter, TaskListResponse};
use crate::api::ticket::{CreateTicket, MoveTicket, TicketFilter, TicketListResponse};
use crate::model::attendance::AttendanceRecord;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::job_title::JobTitle;
use crate::model::project::{Project, ProjectStatus};
use crate::model::task::{Task, TaskStatus};
use crate::model::ticket::{Ticket, TicketPriority, TicketStatus};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Workdesk API",
        version = "1.0.0",
        description = r#"
## Workdesk

This API powers a role-based workplace dashboard covering attendance,
people, projects and support.

### 🔹 Key Features
- **Attendance**
  - Punch in/out toggle, live daily totals, HR table view, span summaries
- **Employee Directory**
  - Create, update, list, and view employee profiles
- **Leave Management**
  - Apply for leave, approve/reject requests, per-type yearly balances
- **Projects & Tasks**
  - Project CRUD, task boards with validated status transitions
- **Support Tickets**
  - Open tickets, triage them through a fixed lifecycle
- **Files & Events**
  - Bucketed object uploads with public URLs, a live change feed

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Four roles exist: **CEO**, **HR**, **Team Leader** and **Employee**;
sensitive operations check the caller's role.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::today,
        crate::api::attendance::punch,
        crate::api::attendance::attendance_list,
        crate::api::attendance::summary,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::org::list_departments,
        crate::api::org::list_job_titles,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::leave_balance,

        crate::api::project::create_project,
        crate::api::project::list_projects,
        crate::api::project::get_project,
        crate::api::project::update_project,
        crate::api::project::delete_project,

        crate::api::task::create_task,
        crate::api::task::list_tasks,
        crate::api::task::get_task,
        crate::api::task::assign_task,
        crate::api::task::task_status,

        crate::api::ticket::create_ticket,
        crate::api::ticket::list_tickets,
        crate::api::ticket::get_ticket,
        crate::api::ticket::ticket_status,

        crate::api::storage::upload,
        crate::api::storage::serve,

        crate::api::events::stream
    ),
    components(
        schemas(
            TodayResponse,
            PunchResponse,
            AttendanceFilter,
            AttendanceListResponse,
            AttendanceRecord,
            SummaryQuery,
            SummaryResponse,

            CreateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            Employee,
            Department,
            JobTitle,

            LeaveType,
            CreateLeave,
            LeaveResponse,
            LeaveListResponse,
            LeaveFilter,
            LeaveBalanceEntry,
            LeaveBalanceResponse,

            CreateProject,
            ProjectFilter,
            ProjectListResponse,
            Project,
            ProjectStatus,

            CreateTask,
            AssignTask,
            MoveTask,
            TaskFilter,
            TaskListResponse,
            Task,
            TaskStatus,

            CreateTicket,
            MoveTicket,
            TicketFilter,
            TicketListResponse,
            Ticket,
            TicketStatus,
            TicketPriority,

            UploadRequest,
            UploadResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Punch toggle and attendance views"),
        (name = "Employee", description = "Employee directory APIs"),
        (name = "Org", description = "Department and job title lookups"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Project", description = "Project management APIs"),
        (name = "Task", description = "Task board APIs"),
        (name = "Ticket", description = "Support ticket APIs"),
        (name = "Storage", description = "Bucketed object storage"),
        (name = "Events", description = "Realtime change feed"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
