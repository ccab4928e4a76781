// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Static description of every endpoint and its response shapes, served at
//! `/schema/`. Kept next to the views it documents; update both together.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub status: u16,
    pub description: &'static str,
    pub content_type: &'static str,
    pub fields: &'static [Field],
}

#[derive(Debug, Serialize)]
pub struct Endpoint {
    pub method: &'static str,
    pub path: &'static str,
    pub auth: bool,
    pub description: &'static str,
    pub request: &'static [Field],
    pub responses: &'static [Response],
}

/// A named object shape that field kinds such as `array<LineItem>` refer to.
#[derive(Debug, Serialize)]
pub struct Definition {
    pub name: &'static str,
    pub fields: &'static [Field],
}

const fn f(name: &'static str, kind: &'static str) -> Field {
    Field { name, kind }
}

const JSON: &str = "application/json";
const CSV: &str = "text/csv";

const MESSAGE: &[Field] = &[f("message", "string")];
const DETAIL: &[Field] = &[f("detail", "string")];

const CAMPAIGN_SUMMARY: &[Field] = &[
    f("id", "integer"),
    f("name", "string"),
    f("created_at", "string<date-time>"),
    f("potential_invoice_amount", "number"),
    f("budget_fulfillment_rate", "integer|null"),
];

const CAMPAIGN_PAGE: &[Field] = &[
    f("count", "integer"),
    f("next", "string<uri>|null"),
    f("previous", "string<uri>|null"),
    f("results", "array<CampaignSummary>"),
];

const LINE_ITEM: &[Field] = &[
    f("id", "integer"),
    f("name", "string"),
    f("booked_amount", "string<decimal>"),
    f("actual_amount", "string<decimal>"),
    f("adjustment_amount", "string<decimal>"),
    f("final_amount", "string<decimal>"),
    f("budget_fulfillment_rate", "integer|null"),
    f("created_at", "string<date-time>"),
    f("updated_at", "string<date-time>"),
];

const CAMPAIGN_DETAIL: &[Field] = &[
    f("id", "integer"),
    f("name", "string"),
    f("created_at", "string"),
    f("potential_invoice_amount", "number"),
    f("line_items", "array<LineItem>"),
];

const FORBIDDEN: Response = Response {
    status: 403,
    description: "Authentication credentials were not provided",
    content_type: JSON,
    fields: DETAIL,
};

pub const ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        method: "POST",
        path: "/login/",
        auth: false,
        description: "User login endpoint",
        request: &[f("username", "string"), f("password", "string")],
        responses: &[
            Response {
                status: 200,
                description: "Login successful",
                content_type: JSON,
                fields: MESSAGE,
            },
            Response {
                status: 400,
                description: "Invalid username or password",
                content_type: JSON,
                fields: MESSAGE,
            },
        ],
    },
    Endpoint {
        method: "POST",
        path: "/logout/",
        auth: true,
        description: "Ends the current session",
        request: &[],
        responses: &[
            Response {
                status: 200,
                description: "Logout successful",
                content_type: JSON,
                fields: MESSAGE,
            },
            FORBIDDEN,
        ],
    },
    Endpoint {
        method: "GET",
        path: "/ping_pong/",
        auth: true,
        description: "Ping-pong endpoint for checking login status",
        request: &[],
        responses: &[
            Response {
                status: 200,
                description: "pong",
                content_type: JSON,
                fields: MESSAGE,
            },
            FORBIDDEN,
        ],
    },
    Endpoint {
        method: "GET",
        path: "/campaign/",
        auth: true,
        description: "Retrieve a paginated list of all campaigns",
        request: &[f("page", "query<integer|last>"), f("page_size", "query<integer>")],
        responses: &[
            Response {
                status: 200,
                description: "One page of campaigns",
                content_type: JSON,
                fields: CAMPAIGN_PAGE,
            },
            FORBIDDEN,
            Response {
                status: 404,
                description: "Invalid page",
                content_type: JSON,
                fields: DETAIL,
            },
        ],
    },
    Endpoint {
        method: "GET",
        path: "/campaign/{id}/",
        auth: true,
        description: "Retrieve a campaign by id",
        request: &[],
        responses: &[
            Response {
                status: 200,
                description: "Campaign with its line items",
                content_type: JSON,
                fields: CAMPAIGN_DETAIL,
            },
            FORBIDDEN,
            Response {
                status: 404,
                description: "Campaign not found",
                content_type: JSON,
                fields: DETAIL,
            },
        ],
    },
    Endpoint {
        method: "POST",
        path: "/campaign/csv/",
        auth: true,
        description: "Download CSV file containing all campaigns with their totals",
        request: &[],
        responses: &[
            Response {
                status: 200,
                description: "CSV file download",
                content_type: CSV,
                fields: &[],
            },
            FORBIDDEN,
        ],
    },
    Endpoint {
        method: "POST",
        path: "/campaign/{id}/line_item/csv/",
        auth: true,
        description: "Download CSV file containing all line items in a campaign",
        request: &[],
        responses: &[
            Response {
                status: 200,
                description: "CSV file download",
                content_type: CSV,
                fields: &[],
            },
            Response {
                status: 400,
                description: "Invalid campaign ID is provided",
                content_type: JSON,
                fields: MESSAGE,
            },
            FORBIDDEN,
        ],
    },
    Endpoint {
        method: "PATCH",
        path: "/line_item/{id}/",
        auth: true,
        description: "Patch the adjustment amount of a line item",
        request: &[f("adjustment_amount", "string<decimal>|number")],
        responses: &[
            Response {
                status: 200,
                description: "Updated line item",
                content_type: JSON,
                fields: LINE_ITEM,
            },
            Response {
                status: 400,
                description: "Invalid adjustment amount",
                content_type: JSON,
                fields: &[f("adjustment_amount", "array<string>")],
            },
            FORBIDDEN,
            Response {
                status: 404,
                description: "Line item not found",
                content_type: JSON,
                fields: DETAIL,
            },
        ],
    },
    Endpoint {
        method: "GET",
        path: "/schema/",
        auth: false,
        description: "This document",
        request: &[],
        responses: &[Response {
            status: 200,
            description: "Endpoint descriptors",
            content_type: JSON,
            fields: &[
                f("endpoints", "array<Endpoint>"),
                f("definitions", "array<Definition>"),
            ],
        }],
    },
];

pub const DEFINITIONS: &[Definition] = &[
    Definition {
        name: "CampaignSummary",
        fields: CAMPAIGN_SUMMARY,
    },
    Definition {
        name: "LineItem",
        fields: LINE_ITEM,
    },
];
