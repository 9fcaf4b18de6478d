use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use devreg_core::Registry;
use devreg_device::{DeviceSnapshot, SimDevice};
use hyper::{Body, Request, Response, Server, StatusCode};
use routerify::ext::RequestExt;
use routerify::{Router, RouterService};
use serde::Serialize;

mod error;
pub use error::{Error, FormattedError};

use crate::config::HttpServer;
use crate::events::EventLog;

#[derive(Clone)]
struct AppState {
    registry: Registry<SimDevice>,
    events: Arc<EventLog>,
}

async fn get_devices(req: Request<Body>) -> Result<Response<Body>, Error> {
    let state = req.data::<AppState>().expect("router always attaches AppState");
    let devices: Vec<DeviceSnapshot> = state.registry.all().iter().map(|d| d.snapshot()).collect();
    Ok(json_response(&devices))
}

async fn get_device_by_guid(req: Request<Body>) -> Result<Response<Body>, Error> {
    let guid = req
        .param("guid")
        .ok_or(Error::MissingParam("guid"))?
        .clone();
    let state = req.data::<AppState>().expect("router always attaches AppState");
    let device = state.registry.find_by_guid(&guid)?;
    Ok(json_response(&device.snapshot()))
}

async fn get_device_by_id(req: Request<Body>) -> Result<Response<Body>, Error> {
    let id = req.param("id").ok_or(Error::MissingParam("id"))?.clone();
    let state = req.data::<AppState>().expect("router always attaches AppState");
    let device = state.registry.find_by_id(&id)?;
    Ok(json_response(&device.snapshot()))
}

/// A snapshot of the most recent lifecycle events, newest last.
async fn get_events(req: Request<Body>) -> Result<Response<Body>, Error> {
    let state = req.data::<AppState>().expect("router always attaches AppState");
    Ok(json_response(&state.events.snapshot()))
}

fn json_response(value: &impl Serialize) -> Response<Body> {
    let body = serde_json::to_vec(value).expect("response value is always serializable");
    Response::builder()
        .header("content-type", "application/json")
        .body(Body::from(body))
        .expect("building a response from an in-memory body never fails")
}

async fn error_handler(err: routerify::RouteError) -> Response<Body> {
    if let Some(err) = err.downcast_ref::<Error>() {
        let formatted: FormattedError = err.into();
        let body = serde_json::to_vec(&formatted).unwrap_or_default();
        Response::builder()
            .status(err.status_code())
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap_or_else(|_| Response::new(Body::empty()))
    } else {
        Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Body::from(err.to_string()))
            .unwrap_or_else(|_| Response::new(Body::empty()))
    }
}

fn router(state: AppState) -> Router<Body, Error> {
    Router::builder()
        .data(state)
        .get("/devices", get_devices)
        .get("/devices/guid/:guid", get_device_by_guid)
        .get("/devices/id/:id", get_device_by_id)
        .get("/events", get_events)
        .err_handler(error_handler)
        .build()
        .expect("could not build http router")
}

pub async fn serve(
    config: HttpServer,
    registry: Registry<SimDevice>,
    events: Arc<EventLog>,
) -> anyhow::Result<()> {
    let bind_address = config
        .bind_address
        .as_deref()
        .unwrap_or("127.0.0.1:5390")
        .to_owned();
    let addr = SocketAddr::from_str(&bind_address).context("parsing http_server.bind_address")?;

    let state = AppState { registry, events };
    let service = RouterService::new(router(state)).expect("building router service");

    log::info!("http query surface listening on {}", addr);
    let server = Server::try_bind(&addr)
        .context("binding http listener")?
        .serve(service);
    server.await.context("http server error")?;
    Ok(())
}
