//! Type names of the widgets the analyzer itself produces or detects.

pub const WIKI_TEXT: &str = "SharePointPnP.Modernization.WikiTextPart";
pub const PAGE_PROPERTIES: &str = "SharePointPnP.Modernization.PagePropertiesPart";

pub const LIST_VIEW: &str =
    "Microsoft.SharePoint.WebPartPages.ListViewWebPart, Microsoft.SharePoint, Version=16.0.0.0, Culture=neutral, PublicKeyToken=71e9bce111e9429c";
pub const XSLT_LIST_VIEW: &str =
    "Microsoft.SharePoint.WebPartPages.XsltListViewWebPart, Microsoft.SharePoint, Version=16.0.0.0, Culture=neutral, PublicKeyToken=71e9bce111e9429c";
pub const MEDIA: &str =
    "Microsoft.SharePoint.Publishing.WebControls.MediaWebPart, Microsoft.SharePoint.Publishing, Version=16.0.0.0, Culture=neutral, PublicKeyToken=71e9bce111e9429c";
pub const PICTURE_LIBRARY_SLIDESHOW: &str =
    "Microsoft.SharePoint.WebPartPages.PictureLibrarySlideshowWebPart, Microsoft.SharePoint, Version=16.0.0.0, Culture=neutral, PublicKeyToken=71e9bce111e9429c";
pub const CHART: &str =
    "Microsoft.Office.Server.WebControls.ChartWebPart, Microsoft.Office.Server.Chart, Version=16.0.0.0, Culture=neutral, PublicKeyToken=71e9bce111e9429c";
pub const SITE_MEMBERS: &str =
    "Microsoft.SharePoint.WebPartPages.MembersWebPart, Microsoft.SharePoint, Version=16.0.0.0, Culture=neutral, PublicKeyToken=71e9bce111e9429c";
pub const SILVERLIGHT: &str =
    "Microsoft.SharePoint.WebPartPages.SilverlightWebPart, Microsoft.SharePoint, Version=16.0.0.0, Culture=neutral, PublicKeyToken=71e9bce111e9429c";
pub const CLIENT: &str =
    "Microsoft.SharePoint.WebPartPages.ClientWebPart, Microsoft.SharePoint, Version=16.0.0.0, Culture=neutral, PublicKeyToken=71e9bce111e9429c";

pub const UNIDENTIFIED: &str = "Unidentified";
pub const NON_EXPORTABLE_UNIDENTIFIED: &str = "NonExportable_Unidentified";
