//! Scripted Space-Track stand-in shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use spacetrack_mcp::catalog::{
    CatalogClient, CatalogError, CatalogResult, HttpReply, HttpSession, SessionFactory,
};
use spacetrack_mcp::config::{CatalogConfig, Credentials};

pub const ISS_LINE1: &str =
    "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
pub const ISS_LINE2: &str =
    "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

/// Element lines of a rocket body that re-entered within hours of its epoch.
pub const DECAYING_LINE1: &str =
    "1 28872U 05037B   05333.02012661  .25992681  00000-0  24476-3 0  1534";
pub const DECAYING_LINE2: &str =
    "2 28872  96.4736 157.9986 0103407 223.1606 147.4533 16.05908836  5091";

/// A JSON body with one record for the decaying rocket body.
pub fn decaying_records() -> String {
    serde_json::json!([{
        "NORAD_CAT_ID": "28872",
        "OBJECT_NAME": "MINOTAUR R/B",
        "EPOCH": "2005-11-29T00:28:58.939104",
        "TLE_LINE1": DECAYING_LINE1,
        "TLE_LINE2": DECAYING_LINE2,
    }])
    .to_string()
}

/// A JSON body with one ISS element set record.
pub fn iss_records() -> String {
    serde_json::json!([{
        "NORAD_CAT_ID": "25544",
        "OBJECT_NAME": "ISS (ZARYA)",
        "EPOCH": "2008-09-20T12:25:40.104192",
        "MEAN_MOTION": "15.72125391",
        "ECCENTRICITY": "0.0006703",
        "TLE_LINE0": "0 ISS (ZARYA)",
        "TLE_LINE1": ISS_LINE1,
        "TLE_LINE2": ISS_LINE2,
    }])
    .to_string()
}

/// What the fake service saw.
#[derive(Debug, Default)]
pub struct Traffic {
    pub sessions_opened: usize,
    pub logins: usize,
    pub logouts: usize,
    pub queries: Vec<String>,
}

#[derive(Clone)]
struct Route {
    needle: String,
    reply: Result<HttpReply, String>,
}

/// Fake service answering queries by URL substring, first match wins.
///
/// Unmatched queries get an empty JSON array.
#[derive(Clone)]
pub struct FakeSpaceTrack {
    login_reply: HttpReply,
    routes: Arc<Mutex<Vec<Route>>>,
    traffic: Arc<Mutex<Traffic>>,
}

impl Default for FakeSpaceTrack {
    fn default() -> Self {
        Self {
            login_reply: HttpReply::text(200, ""),
            routes: Arc::default(),
            traffic: Arc::default(),
        }
    }
}

impl FakeSpaceTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_login_reply(mut self, reply: HttpReply) -> Self {
        self.login_reply = reply;
        self
    }

    pub fn route(self, needle: &str, reply: HttpReply) -> Self {
        self.routes.lock().unwrap().push(Route {
            needle: needle.to_string(),
            reply: Ok(reply),
        });
        self
    }

    pub fn fail(self, needle: &str, message: &str) -> Self {
        self.routes.lock().unwrap().push(Route {
            needle: needle.to_string(),
            reply: Err(message.to_string()),
        });
        self
    }

    pub fn traffic(&self) -> std::sync::MutexGuard<'_, Traffic> {
        self.traffic.lock().unwrap()
    }

    /// Builds a client wired to this fake.
    pub fn client(&self) -> CatalogClient {
        CatalogClient::with_factory(
            Credentials::new("observer", "hunter2"),
            &CatalogConfig::default(),
            self.clone(),
        )
    }
}

impl SessionFactory for FakeSpaceTrack {
    fn open(&self) -> CatalogResult<Box<dyn HttpSession>> {
        self.traffic.lock().unwrap().sessions_opened += 1;
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl HttpSession for FakeSpaceTrack {
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> CatalogResult<HttpReply> {
        assert!(url.ends_with("/ajaxauth/login"), "unexpected POST to {url}");
        assert!(form.contains(&("identity", "observer")));
        assert!(form.contains(&("password", "hunter2")));
        self.traffic.lock().unwrap().logins += 1;
        Ok(self.login_reply.clone())
    }

    async fn get(&self, url: &str) -> CatalogResult<HttpReply> {
        if url.ends_with("/ajaxauth/logout") {
            self.traffic.lock().unwrap().logouts += 1;
            return Ok(HttpReply::text(200, "\"Successfully logged out\""));
        }

        self.traffic.lock().unwrap().queries.push(url.to_string());

        let routes = self.routes.lock().unwrap();
        let Some(route) = routes.iter().find(|r| url.contains(&r.needle)) else {
            return Ok(HttpReply::json(200, "[]"));
        };
        route
            .reply
            .clone()
            .map_err(|message| CatalogError::Transport { message })
    }
}
