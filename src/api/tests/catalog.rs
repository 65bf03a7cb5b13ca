use super::*;

#[tokio::test]
async fn items_start_empty_at_page_one() {
    let (browser, _transfer, _dir) = test_browser(FakeTransfer::completing(b"x"));
    let app = create_router(browser);

    let response = send(&app, "GET", "/items", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["items"].as_array().unwrap().len(), 0);
    assert_eq!(json["next_page"], 1);
    assert_eq!(json["is_loading"], false);
}

#[tokio::test]
async fn next_appends_pages_in_order() {
    let (browser, _transfer, _dir) = test_browser(FakeTransfer::completing(b"x"));
    let app = create_router(browser);

    let first = json_body(send(&app, "POST", "/items/next", None).await).await;
    assert_eq!(first["page"], 1);
    assert_eq!(first["added"], 20);

    let response = send(&app, "POST", "/items/next", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = json_body(response).await;
    assert_eq!(second["page"], 2);
    assert_eq!(second["total_items"], 40);

    let items = json_body(send(&app, "GET", "/items", None).await).await;
    assert_eq!(items["items"][0]["id"], 1);
    assert_eq!(items["items"][20]["id"], 21);
    assert_eq!(items["next_page"], 3);
}

#[tokio::test]
async fn refresh_replaces_the_list() {
    let (browser, _transfer, _dir) = test_browser(FakeTransfer::completing(b"x"));
    let app = create_router(browser);
    send(&app, "POST", "/items/next", None).await;
    send(&app, "POST", "/items/next", None).await;

    let response = send(&app, "POST", "/items/refresh", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let report = json_body(response).await;
    assert_eq!(report["replaced"], true);
    assert_eq!(report["total_items"], 20);

    let items = json_body(send(&app, "GET", "/items", None).await).await;
    assert_eq!(items["next_page"], 2);
}

#[tokio::test]
async fn concurrent_next_is_rejected_with_conflict() {
    let (browser, _transfer, _dir) = test_browser(FakeTransfer::completing(b"x"));
    let app = create_router(browser);

    let (a, b) = tokio::join!(
        send(&app, "POST", "/items/next", None),
        send(&app, "POST", "/items/next", None)
    );

    let mut statuses = [a.status().as_u16(), b.status().as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [200, 409]);
}
